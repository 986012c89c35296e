use crate::adapters::dataset;
use crate::adapters::DocxTemplateEngine;
use crate::core::archive::{self, CONVERTED_FOLDER, DOCUMENTS_FOLDER};
use crate::core::context::build_context;
use crate::core::conversion::convert_letter;
use crate::core::progress::LogProgress;
use crate::core::renderer::LetterRenderer;
use crate::core::tracker::AuditTracker;
use crate::core::{
    BatchInput, BatchResult, ConfigProvider, Converter, Pipeline, ProgressSink, Storage,
    TemplateEngine,
};
use crate::domain::model::{Progress, Record, RecordOutcome};
use crate::domain::schema::NAME_FIELD;
use crate::utils::error::{LetterError, RecordError, Result};
use std::path::Path;

/// Letter generation pipeline: read and validate, render per record, package.
pub struct LetterPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    engine: Box<dyn TemplateEngine>,
    converter: Box<dyn Converter>,
    progress: Box<dyn ProgressSink>,
}

impl<S: Storage, C: ConfigProvider> LetterPipeline<S, C> {
    pub fn new(storage: S, config: C, converter: impl Converter + 'static) -> Self {
        Self {
            storage,
            config,
            engine: Box::new(DocxTemplateEngine::new()),
            converter: Box::new(converter),
            progress: Box::new(LogProgress),
        }
    }

    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Runs one record to its terminal state. Never fails; errors become the outcome.
    async fn process_record(
        &self,
        record: &Record,
        columns: &[String],
        renderer: &LetterRenderer<'_>,
        converted_dir: &Path,
    ) -> RecordOutcome {
        let rendered = build_context(record, columns, self.config.schema())
            .map_err(RecordError::from)
            .and_then(|context| renderer.render(&context));

        let letter = match rendered {
            Ok(letter) => letter,
            Err(e) => {
                tracing::warn!("❌ {}: {}", record.text(NAME_FIELD), e);
                return RecordOutcome::RenderFailed {
                    reason: e.to_string(),
                };
            }
        };

        let mode = self.config.output_mode();
        if !mode.wants_conversion() {
            return RecordOutcome::RenderedOnly;
        }

        convert_letter(
            self.converter.as_ref(),
            &letter,
            converted_dir,
            mode,
            self.config.conversion_timeout(),
        )
        .await
    }
}

fn read_input(field: &str, path: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| LetterError::InvalidConfigValueError {
        field: field.to_string(),
        value: path.to_string(),
        reason: format!("cannot read file: {}", e),
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LetterPipeline<S, C> {
    async fn extract(&self) -> Result<BatchInput> {
        tracing::info!("📥 Reading employee data from {}", self.config.dataset_path());

        let template = read_input("template", self.config.template_path())?;
        let dataset = dataset::read_dataset(Path::new(self.config.dataset_path()))?;

        let missing = self.config.schema().missing_fields(&dataset.columns);
        if !missing.is_empty() {
            tracing::error!("❌ Missing headers: {}", missing.join(", "));
            return Err(LetterError::MissingFieldsError { fields: missing });
        }

        if !dataset.skipped_rows.is_empty() {
            let rows: Vec<String> = dataset.skipped_rows.iter().map(|r| r.to_string()).collect();
            tracing::warn!(
                "⚠️ Skipped {} blank row(s), no letter or audit entry: {}",
                rows.len(),
                rows.join(", ")
            );
        }

        tracing::info!("✅ Ready! {} records verified.", dataset.len());
        Ok(BatchInput { dataset, template })
    }

    async fn transform(&self, input: BatchInput) -> Result<BatchResult> {
        let mode = self.config.output_mode();
        tracing::info!(
            "🔧 Generating {} letters ({})",
            input.dataset.len(),
            mode.label()
        );

        // 暫存目錄在離開此函式時（不論成功或錯誤）自動刪除
        let workspace = tempfile::Builder::new().prefix("letter-merge-").tempdir()?;
        let documents_dir = workspace.path().join(DOCUMENTS_FOLDER);
        let converted_dir = workspace.path().join(CONVERTED_FOLDER);
        std::fs::create_dir_all(&documents_dir)?;
        std::fs::create_dir_all(&converted_dir)?;

        let renderer = LetterRenderer::new(
            self.engine.as_ref(),
            &input.template,
            self.config.name_format(),
            &documents_dir,
        );

        let total = input.dataset.len();
        let mut tracker = AuditTracker::new(mode.wants_conversion());

        for (index, record) in input.dataset.records.iter().enumerate() {
            let name = record.text(NAME_FIELD);
            let outcome = self
                .process_record(record, &input.dataset.columns, &renderer, &converted_dir)
                .await;

            let entry = tracker.record(name.clone(), outcome);
            tracing::debug!("{} -> {}", entry.name, entry.status);

            self.progress.report(&Progress {
                done: index + 1,
                total,
                name,
            });
        }

        let mut artifacts = archive::collect_artifacts(&documents_dir, DOCUMENTS_FOLDER)?;
        artifacts.extend(archive::collect_artifacts(&converted_dir, CONVERTED_FOLDER)?);

        let result = tracker.finish(artifacts);
        tracing::info!(
            "✅ Generation complete: {} of {} rendered, {} converted",
            result.rendered,
            result.total,
            result.converted
        );
        Ok(result)
    }

    async fn load(&self, result: BatchResult) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        let zip_data = archive::package(&result)?;

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        tracing::info!("📦 Archive saved: {}", output_path);
        Ok(output_path)
    }
}
