use crate::domain::model::{BatchInput, BatchResult, OutputMode, Progress, RenderContext};
use crate::domain::schema::FieldSchema;
use crate::utils::error::{RenderError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn dataset_path(&self) -> &str;
    fn template_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn name_format(&self) -> &str;
    fn output_mode(&self) -> OutputMode;
    fn converter_command(&self) -> &str;
    fn conversion_timeout(&self) -> Duration;
    fn archive_name(&self) -> &str;
    fn schema(&self) -> &FieldSchema;
}

/// Merge-field substitution over a binary document template.
pub trait TemplateEngine: Send + Sync {
    /// Returns a filled copy; `template` itself is never touched.
    fn render(
        &self,
        template: &[u8],
        context: &RenderContext,
    ) -> std::result::Result<Vec<u8>, RenderError>;
}

/// Out-of-process format conversion.
///
/// Implementations should not judge success themselves; the caller checks
/// for the converted file and bounds the call with its own timeout.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, input: &Path, out_dir: &Path) -> std::io::Result<()>;
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &Progress);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<BatchInput>;
    async fn transform(&self, input: BatchInput) -> Result<BatchResult>;
    async fn load(&self, result: BatchResult) -> Result<String>;
}
