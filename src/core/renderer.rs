use crate::domain::model::{RenderContext, NAME_TOKEN};
use crate::domain::ports::TemplateEngine;
use crate::domain::schema::NAME_FIELD;
use crate::utils::error::{RecordError, RenderError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ILLEGAL_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

pub const DOCUMENT_EXTENSION: &str = "docx";

/// Substitutes the employee name into `pattern`, then strips characters
/// that are illegal in file names and trims the result.
///
/// Two records that end up with the same name overwrite each other's files.
pub fn derive_file_name(pattern: &str, employee_name: &str) -> String {
    let substituted = pattern.replace(NAME_TOKEN, employee_name);
    ILLEGAL_FILENAME_CHARS
        .replace_all(&substituted, "")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLetter {
    pub file_stem: String,
    pub path: PathBuf,
}

/// Fills the template for one record and writes it to `out_dir`.
pub struct LetterRenderer<'a> {
    engine: &'a dyn TemplateEngine,
    template: &'a [u8],
    name_format: &'a str,
    out_dir: &'a Path,
}

impl<'a> LetterRenderer<'a> {
    pub fn new(
        engine: &'a dyn TemplateEngine,
        template: &'a [u8],
        name_format: &'a str,
        out_dir: &'a Path,
    ) -> Self {
        Self {
            engine,
            template,
            name_format,
            out_dir,
        }
    }

    pub fn render(&self, context: &RenderContext) -> Result<RenderedLetter, RecordError> {
        let employee_name = context.get(NAME_FIELD).unwrap_or_default();
        let file_stem = derive_file_name(self.name_format, employee_name);
        if file_stem.is_empty() {
            return Err(RenderError::EmptyFileName.into());
        }

        let document = self.engine.render(self.template, context)?;

        let path = self
            .out_dir
            .join(format!("{}.{}", file_stem, DOCUMENT_EXTENSION));
        std::fs::write(&path, document)?;

        tracing::debug!("Rendered {}", path.display());
        Ok(RenderedLetter { file_stem, path })
    }
}
