use crate::core::renderer::RenderedLetter;
use crate::domain::model::{ConversionFailure, OutputMode, RecordOutcome};
use crate::domain::ports::Converter;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONVERTED_EXTENSION: &str = "pdf";

pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(30);

pub fn expected_output(letter: &RenderedLetter, out_dir: &Path) -> PathBuf {
    out_dir.join(format!("{}.{}", letter.file_stem, CONVERTED_EXTENSION))
}

/// Best-effort conversion of one rendered letter.
///
/// Success means the expected PDF exists once the converter returns. A
/// converter still running at `timeout` is abandoned, not killed. In PDF-only
/// mode the Word copy is removed after a successful conversion and kept
/// otherwise.
pub async fn convert_letter(
    converter: &dyn Converter,
    letter: &RenderedLetter,
    out_dir: &Path,
    mode: OutputMode,
    timeout: Duration,
) -> RecordOutcome {
    let expected = expected_output(letter, out_dir);

    // 同名的前一筆可能已留下 PDF
    if expected.exists() {
        if let Err(e) = std::fs::remove_file(&expected) {
            return RecordOutcome::ConversionFailed {
                failure: ConversionFailure::Error(e.to_string()),
            };
        }
    }

    let failure = match tokio::time::timeout(timeout, converter.convert(&letter.path, out_dir)).await {
        Err(_) => {
            tracing::warn!(
                "⏱️ Conversion of {} timed out after {:?}",
                letter.file_stem,
                timeout
            );
            ConversionFailure::Timeout
        }
        Ok(Err(e)) => {
            tracing::warn!("Conversion of {} failed: {}", letter.file_stem, e);
            ConversionFailure::Error(e.to_string())
        }
        Ok(Ok(())) if expected.exists() => {
            if !mode.keeps_documents() {
                if let Err(e) = std::fs::remove_file(&letter.path) {
                    tracing::warn!("Could not remove {}: {}", letter.path.display(), e);
                }
            }
            return RecordOutcome::RenderedAndConverted;
        }
        Ok(Ok(())) => {
            tracing::warn!(
                "Converter finished but {} was not created",
                expected.display()
            );
            ConversionFailure::NoOutput
        }
    };

    RecordOutcome::ConversionFailed { failure }
}
