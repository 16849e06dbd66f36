use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting ETL process...");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} raw posts", raw_data.len());

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed {} posts ({} duplicates removed)",
            transformed.analyzed_posts.len(),
            transformed.preprocess.duplicates_removed
        );

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
