use anyhow::Context;
use clap::Parser;
use std::path::Path;
use whoosh_sentiment::core::import::import_dataset;
use whoosh_sentiment::core::tables::{read_table, TableName};
use whoosh_sentiment::core::view::{render_distribution, render_table};
use whoosh_sentiment::core::ConfigProvider;
use whoosh_sentiment::domain::model::{AnalyzedPost, SentimentSummary};
use whoosh_sentiment::utils::error::{EtlError, ErrorSeverity};
use whoosh_sentiment::utils::{logger, validation::Validate};
use whoosh_sentiment::{CliConfig, Command, EtlEngine, LocalStorage, TomlConfig, WhooshPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_format);
    tracing::info!("Starting whoosh-sentiment");

    let command = cli.command.clone();
    let outcome = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("Failed to load config file '{}'", path))?;
            validate_or_exit(&config);
            run_command(command, config).await
        }
        None => {
            validate_or_exit(&cli);
            run_command(command, cli).await
        }
    };

    if let Err(e) = outcome {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn validate_or_exit<V: Validate>(config: &V) {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
}

async fn run_command<C: ConfigProvider>(command: Command, config: C) -> Result<(), EtlError> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = WhooshPipeline::new(storage.clone(), config);

    match command {
        Command::Collect => {
            let report = pipeline.collect().await?;
            println!(
                "✅ Collected approximately {} posts in {} requests.",
                report.posts_fetched, report.requests_made
            );
        }
        Command::Preprocess => {
            let report = pipeline.preprocess().await?;
            println!(
                "✅ Preprocessed {} posts. Removed {} duplicates.",
                report.kept, report.duplicates_removed
            );
        }
        Command::Analyze => {
            let summary = pipeline.analyze().await?;
            println!("Sentiment summary:");
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Run => {
            let engine = EtlEngine::new(pipeline);
            let output_path = engine.run().await?;
            let analysis: Vec<AnalyzedPost> = read_table(&storage, TableName::Analysis).await?;
            let summary = SentimentSummary::from_posts(&analysis);
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            print!("{}", render_distribution(&summary));
        }
        Command::Import { path } => {
            let report = import_dataset(&storage, Path::new(&path)).await?;
            println!(
                "✅ Loaded {} rows from {}",
                report.rows,
                report.source.display()
            );
        }
        Command::View { table } => {
            print!("{}", render_table(&storage, table).await?);
        }
        Command::Score { text } => {
            let result = pipeline.scorer().score(&text);
            println!("{} ({:.2})", result.label, result.score);
        }
    }

    Ok(())
}
