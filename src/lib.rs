pub mod config;
pub mod core;
pub mod domain;
pub mod sentiment;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use core::{etl::EtlEngine, pipeline::WhooshPipeline};
pub use sentiment::{score_sentiment, Sentiment, SentimentScore, SentimentScorer};
pub use utils::error::{EtlError, Result};
