use crate::config::{
    DEFAULT_API_ENDPOINT, DEFAULT_KEYWORDS, DEFAULT_LANGUAGES, DEFAULT_MAX_REQUESTS,
    DEFAULT_MAX_RESULTS, DEFAULT_OUTPUT_PATH, DEFAULT_PAGE_DELAY_MS,
    DEFAULT_RATE_LIMIT_RETRIES, DEFAULT_RATE_LIMIT_WAIT_SECONDS, DEFAULT_TIMEOUT_SECONDS,
    MAX_RESULTS_PER_PAGE, MIN_RESULTS_PER_PAGE,
};
use crate::core::ConfigProvider;
use crate::sentiment::LexiconConfig;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// `${VAR}` placeholder; one left in a value means the variable was unset.
pub static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub lexicon: Option<LexiconConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub bearer_token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub rate_limit_wait_seconds: Option<u64>,
    pub rate_limit_retries: Option<u32>,
    pub page_delay_ms: Option<u64>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    pub max_requests: Option<usize>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            languages: default_languages(),
            max_requests: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${X_BEARER})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_url("source.endpoint", self.api_endpoint())?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_positive_number("collect.max_requests", self.max_requests(), 1)?;
        validation::validate_range(
            "source.max_results",
            self.max_results(),
            MIN_RESULTS_PER_PAGE,
            MAX_RESULTS_PER_PAGE,
        )?;
        validation::validate_non_empty_list("collect.keywords", &self.collect.keywords)?;
        validation::validate_non_empty_list("collect.languages", &self.collect.languages)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT)
    }

    fn bearer_token(&self) -> Option<&str> {
        self.source.bearer_token.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn keywords(&self) -> &[String] {
        &self.collect.keywords
    }

    fn languages(&self) -> &[String] {
        &self.collect.languages
    }

    fn max_requests(&self) -> usize {
        self.collect.max_requests.unwrap_or(DEFAULT_MAX_REQUESTS)
    }

    fn max_results(&self) -> u32 {
        self.source.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }

    fn page_delay(&self) -> Duration {
        Duration::from_millis(self.source.page_delay_ms.unwrap_or(DEFAULT_PAGE_DELAY_MS))
    }

    fn rate_limit_wait(&self) -> Duration {
        Duration::from_secs(
            self.source
                .rate_limit_wait_seconds
                .unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECONDS),
        )
    }

    fn rate_limit_retries(&self) -> u32 {
        self.source
            .rate_limit_retries
            .unwrap_or(DEFAULT_RATE_LIMIT_RETRIES)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn lexicon(&self) -> Option<&LexiconConfig> {
        self.lexicon.as_ref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
