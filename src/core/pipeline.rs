use crate::core::analysis::{analyze_posts, summarize};
use crate::core::collector::PostCollector;
use crate::core::preprocess::clean_and_dedup;
use crate::core::tables::{
    insert_ignore, insert_rows, read_table, upsert_analysis, write_table, TableName,
};
use crate::core::{ConfigProvider, Pipeline, RawPost, Storage, TransformResult};
use crate::domain::model::{
    AnalyzedPost, CleanPost, CollectReport, PreprocessReport, SentimentSummary,
};
use crate::sentiment::{Lexicon, SentimentScorer};
use crate::utils::error::{EtlError, Result};

/// Collect → preprocess → analyze over CSV tables in `Storage`.
pub struct WhooshPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    lexicon: Lexicon,
}

impl<S: Storage, C: ConfigProvider> WhooshPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let lexicon = match config.lexicon() {
            Some(extra) => Lexicon::with_additions(extra),
            None => Lexicon::default(),
        };

        Self {
            storage,
            config,
            lexicon,
        }
    }

    pub fn scorer(&self) -> SentimentScorer<'_> {
        SentimentScorer::new(&self.lexicon)
    }

    /// 抓取貼文並寫入 whoosh_raw（已存在的 tweet_id 不覆蓋）
    pub async fn collect(&self) -> Result<CollectReport> {
        let collector = PostCollector::new(&self.config)?;
        let (posts, report) = collector.collect().await?;

        let inserted = insert_rows(&self.storage, TableName::Raw, posts).await?;
        tracing::info!("💾 Inserted {} new rows into {}", inserted, TableName::Raw);
        Ok(report)
    }

    pub async fn preprocess(&self) -> Result<PreprocessReport> {
        let raw: Vec<RawPost> = read_table(&self.storage, TableName::Raw).await?;
        if raw.is_empty() {
            tracing::warn!("No data to preprocess.");
            return Ok(PreprocessReport::default());
        }

        let (clean_posts, report) = clean_and_dedup(raw);
        insert_rows(&self.storage, TableName::Clean, clean_posts).await?;
        Ok(report)
    }

    pub async fn analyze(&self) -> Result<SentimentSummary> {
        let clean: Vec<CleanPost> = read_table(&self.storage, TableName::Clean).await?;
        if clean.is_empty() {
            return Err(EtlError::EmptyTableError {
                table: TableName::Clean.to_string(),
            });
        }

        let analyzed = analyze_posts(&self.scorer(), &clean);
        let summary = summarize(&analyzed);
        self.store_analysis(analyzed).await?;
        Ok(summary)
    }

    async fn store_analysis(&self, analyzed: Vec<AnalyzedPost>) -> Result<()> {
        let mut existing: Vec<AnalyzedPost> = read_table(&self.storage, TableName::Analysis).await?;
        upsert_analysis(&mut existing, analyzed);
        write_table(&self.storage, TableName::Analysis, &existing).await
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for WhooshPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawPost>> {
        let report = self.collect().await?;
        tracing::debug!(
            "Collect finished after {} requests ({} posts)",
            report.requests_made,
            report.posts_fetched
        );
        read_table(&self.storage, TableName::Raw).await
    }

    async fn transform(&self, data: Vec<RawPost>) -> Result<TransformResult> {
        tracing::info!("🔧 Transforming {} raw posts", data.len());

        let (clean_posts, preprocess) = clean_and_dedup(data);
        let analyzed_posts = analyze_posts(&self.scorer(), &clean_posts);
        let summary = summarize(&analyzed_posts);

        Ok(TransformResult {
            clean_posts,
            analyzed_posts,
            preprocess,
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut clean: Vec<CleanPost> = read_table(&self.storage, TableName::Clean).await?;
        let inserted = insert_ignore(&mut clean, result.clean_posts);
        write_table(&self.storage, TableName::Clean, &clean).await?;
        tracing::debug!("Inserted {} new rows into {}", inserted, TableName::Clean);

        self.store_analysis(result.analyzed_posts).await?;

        let output_path = format!(
            "{}/{}",
            self.config.output_path(),
            TableName::Analysis.file_name()
        );
        tracing::info!("📁 Analysis saved: {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Sentiment;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        api_endpoint: String,
        keywords: Vec<String>,
        languages: Vec<String>,
    }

    impl MockConfig {
        fn new(api_endpoint: String) -> Self {
            Self {
                api_endpoint,
                keywords: vec!["whoosh".to_string()],
                languages: vec!["id".to_string()],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn bearer_token(&self) -> Option<&str> {
            Some("test-token")
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn keywords(&self) -> &[String] {
            &self.keywords
        }

        fn languages(&self) -> &[String] {
            &self.languages
        }

        fn max_requests(&self) -> usize {
            5
        }

        fn max_results(&self) -> u32 {
            100
        }

        fn page_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn rate_limit_wait(&self) -> Duration {
            Duration::ZERO
        }

        fn rate_limit_retries(&self) -> u32 {
            0
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn raw(id: &str, text: &str) -> RawPost {
        RawPost {
            tweet_id: id.to_string(),
            author_id: "1".to_string(),
            created_at: "2025-10-01T08:30:00Z".parse().unwrap(),
            text: text.to_string(),
            lang: "id".to_string(),
        }
    }

    #[tokio::test]
    async fn test_stage_by_stage() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(serde_json::json!({
                "data": [
                    {"id": "1", "text": "Whoosh nyaman banget @kcic", "author_id": "9",
                     "created_at": "2025-10-01T08:30:00.000Z", "lang": "id"},
                    {"id": "2", "text": "whoosh nyaman banget https://t.co/x", "author_id": "9",
                     "created_at": "2025-10-01T09:30:00.000Z", "lang": "id"},
                    {"id": "3", "text": "tiket #Whoosh mahal", "author_id": "8",
                     "created_at": "2025-10-01T10:30:00.000Z", "lang": "id"}
                ],
                "meta": {}
            }));
        });

        let storage = MockStorage::default();
        let pipeline = WhooshPipeline::new(storage.clone(), MockConfig::new(server.url("/search")));

        let collected = pipeline.collect().await.unwrap();
        api_mock.assert();
        assert_eq!(collected.posts_fetched, 3);

        let preprocessed = pipeline.preprocess().await.unwrap();
        assert_eq!(preprocessed.kept, 2);
        assert_eq!(preprocessed.duplicates_removed, 1);

        let summary = pipeline.analyze().await.unwrap();
        assert_eq!(summary.positive, 1);
        assert_eq!(summary.negative, 1);

        let analysis: Vec<AnalyzedPost> = read_table(&storage, TableName::Analysis).await.unwrap();
        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis[1].tweet_id, "3");
        assert_eq!(analysis[1].text_clean, "tiket whoosh mahal");
        assert_eq!(analysis[1].sentiment, Sentiment::Negative);
    }

    #[tokio::test]
    async fn test_analyze_without_clean_data_fails() {
        let pipeline = WhooshPipeline::new(
            MockStorage::default(),
            MockConfig::new("http://localhost".to_string()),
        );

        assert!(matches!(
            pipeline.analyze().await,
            Err(EtlError::EmptyTableError { .. })
        ));
        assert_eq!(pipeline.preprocess().await.unwrap(), PreprocessReport::default());
    }

    #[tokio::test]
    async fn test_transform_and_load() {
        let storage = MockStorage::default();
        let pipeline = WhooshPipeline::new(
            storage.clone(),
            MockConfig::new("http://localhost".to_string()),
        );

        let result = pipeline
            .transform(vec![
                raw("1", "Tidak lambat !"),
                raw("2", "tidak  lambat !"),
                raw("3", "kcic bagus tapi mahal"),
            ])
            .await
            .unwrap();

        assert_eq!(result.clean_posts.len(), 2);
        assert_eq!(result.preprocess.duplicates_removed, 1);
        // "tidak lambat !": 1.5 再扣反諷 1.0
        assert!((result.analyzed_posts[0].score - 0.5).abs() < 1e-9);
        assert_eq!(result.analyzed_posts[0].sentiment, Sentiment::Neutral);
        assert_eq!(result.analyzed_posts[1].sentiment, Sentiment::Negative);

        let output_path = pipeline.load(result).await.unwrap();
        assert_eq!(output_path, "test_output/whoosh_analysis.csv");

        let clean: Vec<CleanPost> = read_table(&storage, TableName::Clean).await.unwrap();
        assert_eq!(clean.len(), 2);
    }

    #[tokio::test]
    async fn test_reanalysis_updates_existing_rows() {
        let storage = MockStorage::default();
        let pipeline = WhooshPipeline::new(
            storage.clone(),
            MockConfig::new("http://localhost".to_string()),
        );

        let first = pipeline.transform(vec![raw("1", "whoosh")]).await.unwrap();
        pipeline.load(first).await.unwrap();

        // 同一個 tweet_id 重新分析
        let mut second = pipeline.transform(vec![raw("1", "whoosh")]).await.unwrap();
        second.analyzed_posts[0].sentiment = Sentiment::Positive;
        pipeline.load(second).await.unwrap();

        let analysis: Vec<AnalyzedPost> = read_table(&storage, TableName::Analysis).await.unwrap();
        assert_eq!(analysis.len(), 1);
        assert_eq!(analysis[0].sentiment, Sentiment::Positive);
    }
}
