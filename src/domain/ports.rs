use crate::domain::model::{RawPost, TransformResult};
use crate::sentiment::LexiconConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn bearer_token(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn keywords(&self) -> &[String];
    fn languages(&self) -> &[String];
    fn max_requests(&self) -> usize;
    fn max_results(&self) -> u32;
    fn page_delay(&self) -> Duration;
    fn rate_limit_wait(&self) -> Duration;
    fn rate_limit_retries(&self) -> u32;
    fn request_timeout(&self) -> Duration;

    fn lexicon(&self) -> Option<&LexiconConfig> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawPost>>;
    async fn transform(&self, data: Vec<RawPost>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
