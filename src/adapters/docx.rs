use crate::domain::model::RenderContext;
use crate::domain::ports::TemplateEngine;
use crate::utils::error::RenderError;
use regex::Regex;
use std::io::{Cursor, Read, Write};
use std::sync::LazyLock;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime, ZipArchive};

const DOCUMENT_PART: &str = "word/document.xml";

static XML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
// Word 有時把 {{ 或 }} 本身拆到兩個 run
static SPLIT_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(?:<[^>]*>)+\{").unwrap());
static SPLIT_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}(?:<[^>]*>)+\}").unwrap());
static PLACEHOLDER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Fills `{{ field }}` placeholders in a Word (.docx) template.
///
/// Only the text-bearing parts of the package are rewritten; every other
/// entry is copied through. Entries are written with a fixed timestamp so the
/// same template and context always produce the same bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTemplateEngine;

impl DocxTemplateEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for DocxTemplateEngine {
    fn render(&self, template: &[u8], context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(template))
            .map_err(|e| RenderError::MalformedTemplate(e.to_string()))?;

        if !archive.file_names().any(|name| name == DOCUMENT_PART) {
            return Err(RenderError::MalformedTemplate(format!(
                "missing {}",
                DOCUMENT_PART
            )));
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| RenderError::MalformedTemplate(e.to_string()))?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                writer
                    .add_directory(name, options)
                    .map_err(|e| RenderError::Package(e.to_string()))?;
                continue;
            }

            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| RenderError::MalformedTemplate(format!("{}: {}", name, e)))?;

            if is_text_part(&name) {
                let xml = String::from_utf8(data)
                    .map_err(|e| RenderError::MalformedTemplate(format!("{}: {}", name, e)))?;
                data = fill_placeholders(&xml, context)?.into_bytes();
            }

            writer
                .start_file(name, options)
                .map_err(|e| RenderError::Package(e.to_string()))?;
            writer
                .write_all(&data)
                .map_err(|e| RenderError::Package(e.to_string()))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| RenderError::Package(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

fn is_text_part(name: &str) -> bool {
    if name == DOCUMENT_PART || name == "word/footnotes.xml" || name == "word/endnotes.xml" {
        return true;
    }
    (name.starts_with("word/header") || name.starts_with("word/footer")) && name.ends_with(".xml")
}

/// Replaces every known placeholder in one XML part.
///
/// Word often splits a placeholder over several runs. Markup inside a
/// doubled brace is dropped first; markup found between the braces is kept
/// and emitted after the value. Placeholders with no matching field are left
/// untouched.
pub fn fill_placeholders(xml: &str, context: &RenderContext) -> Result<String, RenderError> {
    let opened = SPLIT_OPEN.replace_all(xml, "{{");
    let joined = SPLIT_CLOSE.replace_all(&opened, "}}");

    let mut out = String::with_capacity(joined.len());
    let mut rest: &str = &joined;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after
            .find("}}")
            .ok_or_else(|| RenderError::UnclosedPlaceholder(snippet(&rest[start..])))?;
        let raw = &after[..end];

        let markup: String = XML_TAG.find_iter(raw).map(|m| m.as_str()).collect();
        let stripped = XML_TAG.replace_all(raw, "");
        let field = stripped.trim();

        if !PLACEHOLDER_NAME.is_match(field) {
            return Err(RenderError::InvalidPlaceholder(field.to_string()));
        }

        match context.get(field) {
            Some(value) => {
                out.push_str(&escape_xml(value));
                out.push_str(&markup);
            }
            None => out.push_str(&rest[start..start + end + 4]),
        }

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn snippet(s: &str) -> String {
    s.chars().take(24).collect()
}
