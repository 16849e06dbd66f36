pub mod cli;
pub mod toml_config;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.twitter.com/2/tweets/search/recent";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_KEYWORDS: &[&str] = &["kereta cepat whoosh", "whoosh", "kcic"];
pub const DEFAULT_LANGUAGES: &[&str] = &["id", "en"];
pub const DEFAULT_MAX_REQUESTS: usize = 100;
pub const DEFAULT_MAX_RESULTS: u32 = 100;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 2000;
pub const DEFAULT_RATE_LIMIT_WAIT_SECONDS: u64 = 60;
pub const DEFAULT_RATE_LIMIT_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

// 搜尋 API 單頁筆數限制
pub const MIN_RESULTS_PER_PAGE: u32 = 10;
pub const MAX_RESULTS_PER_PAGE: u32 = 100;

#[cfg(feature = "cli")]
use crate::core::tables::TableName;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "whoosh-sentiment")]
#[command(about = "Collect, clean and score social-media posts about the Whoosh train")]
pub struct CliConfig {
    /// Load settings from a TOML file instead of flags
    #[arg(long, short, global = true)]
    pub config: Option<String>,

    #[arg(long, global = true, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, global = true, env = "X_BEARER", hide_env_values = true)]
    pub bearer_token: Option<String>,

    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, global = true, value_delimiter = ',', default_values = DEFAULT_KEYWORDS)]
    pub keywords: Vec<String>,

    #[arg(long, global = true, value_delimiter = ',', default_values = DEFAULT_LANGUAGES)]
    pub languages: Vec<String>,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_REQUESTS)]
    pub max_requests: usize,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: u32,

    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_DELAY_MS)]
    pub page_delay_ms: u64,

    #[arg(long, global = true, default_value_t = DEFAULT_RATE_LIMIT_WAIT_SECONDS)]
    pub rate_limit_wait_seconds: u64,

    #[arg(long, global = true, default_value_t = DEFAULT_RATE_LIMIT_RETRIES)]
    pub rate_limit_retries: u32,

    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch posts from the search API into whoosh_raw
    Collect,
    /// Clean and deduplicate whoosh_raw into whoosh_clean
    Preprocess,
    /// Score whoosh_clean into whoosh_analysis
    Analyze,
    /// Run collect, preprocess and analyze in one go
    Run,
    /// Import an external CSV dataset into kaggle_whoosh
    Import {
        /// CSV file, or a directory containing one
        path: String,
    },
    /// Show the newest rows of a table
    View {
        #[arg(value_enum)]
        table: TableName,
    },
    /// Score a single piece of text
    Score { text: String },
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn languages(&self) -> &[String] {
        &self.languages
    }

    fn max_requests(&self) -> usize {
        self.max_requests
    }

    fn max_results(&self) -> u32 {
        self.max_results
    }

    fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    fn rate_limit_wait(&self) -> Duration {
        Duration::from_secs(self.rate_limit_wait_seconds)
    }

    fn rate_limit_retries(&self) -> u32 {
        self.rate_limit_retries
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("max_requests", self.max_requests, 1)?;
        validation::validate_range(
            "max_results",
            self.max_results,
            MIN_RESULTS_PER_PAGE,
            MAX_RESULTS_PER_PAGE,
        )?;
        validation::validate_non_empty_list("keywords", &self.keywords)?;
        validation::validate_non_empty_list("languages", &self.languages)?;
        Ok(())
    }
}
