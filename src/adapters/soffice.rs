use crate::domain::ports::Converter;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

pub const DEFAULT_CONVERTER: &str = "soffice";

/// Converts documents to PDF with a headless LibreOffice.
///
/// The exit status is only logged. LibreOffice reports success in cases where
/// it wrote nothing, so callers look for the PDF instead.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    program: String,
}

impl SofficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER)
    }
}

#[async_trait]
impl Converter for SofficeConverter {
    async fn convert(&self, input: &Path, out_dir: &Path) -> std::io::Result<()> {
        tracing::debug!(
            "Running {} --headless --convert-to pdf --outdir {} {}",
            self.program,
            out_dir.display(),
            input.display()
        );

        // 逾時由呼叫端處理；不設 kill_on_drop，放棄等待時程序照常結束
        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await?;

        if output.status.success() {
            tracing::debug!("{} exited with {}", self.program, output.status);
        } else {
            tracing::debug!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let dir = TempDir::new().unwrap();
        let converter = SofficeConverter::new("definitely-not-an-installed-converter");

        let result = converter
            .convert(&dir.path().join("letter.docx"), dir.path())
            .await;

        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_not_authoritative() {
        let dir = TempDir::new().unwrap();
        // `false` ignores its arguments and exits non-zero
        let converter = SofficeConverter::new("false");

        let result = converter
            .convert(&dir.path().join("letter.docx"), dir.path())
            .await;

        assert!(result.is_ok());
        assert!(!dir.path().join("letter.pdf").exists());
    }

    #[test]
    fn test_default_program() {
        assert_eq!(SofficeConverter::default().program(), "soffice");
    }
}
