use crate::core::Pipeline;
use crate::domain::model::{AuditEntry, BatchSummary};
use crate::utils::error::Result;
use serde::Serialize;

/// What a finished run hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub output_path: String,
    pub summary: BatchSummary,
    pub audit: Vec<AuditEntry>,
}

pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<BatchReport> {
        tracing::info!("🚀 Starting letter generation");

        // Extract
        let input = self.pipeline.extract().await?;

        // Transform
        let result = self.pipeline.transform(input).await?;
        let summary = result.summary();
        let audit = result.audit.clone();
        tracing::info!("📊 {}", summary);

        // Load
        let output_path = self.pipeline.load(result).await?;

        Ok(BatchReport {
            output_path,
            summary,
            audit,
        })
    }
}
