use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Literal token replaced by the employee's name in the naming pattern.
pub const NAME_TOKEN: &str = "{employee_name}";

/// Raw value of one dataset cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Blank text counts as empty, same as a truly missing cell.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            // 試算表的整數常以 50000.0 形式出現
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// One dataset row keyed by column name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, CellValue>,
}

impl Record {
    pub fn get(&self, field: &str) -> &CellValue {
        self.data.get(field).unwrap_or(&CellValue::Empty)
    }

    /// Trimmed natural string form, empty for missing cells.
    pub fn text(&self, field: &str) -> String {
        let value = self.get(field);
        if value.is_empty() {
            String::new()
        } else {
            value.to_string().trim().to_string()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    /// Sheet row numbers (header is row 1) dropped because every cell was blank.
    pub skipped_rows: Vec<usize>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Everything extract hands to transform.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub dataset: Dataset,
    pub template: Vec<u8>,
}

/// Field name to substitution text for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenderContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = RenderContext::new();
        for (k, v) in iter {
            context.insert(k, v);
        }
        context
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Word documents only
    Docx,
    /// PDF only; the Word copy is dropped once its PDF exists
    Pdf,
    /// Word documents and PDFs
    #[default]
    Both,
}

impl OutputMode {
    pub fn wants_conversion(self) -> bool {
        matches!(self, OutputMode::Pdf | OutputMode::Both)
    }

    pub fn keeps_documents(self) -> bool {
        !matches!(self, OutputMode::Pdf)
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputMode::Docx => "DOCX Only",
            OutputMode::Pdf => "PDF Only",
            OutputMode::Both => "Both (DOCX+PDF)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ConversionFailure {
    /// Converter returned but the expected file is not there.
    NoOutput,
    Timeout,
    Error(String),
}

/// Terminal state of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    RenderFailed { reason: String },
    RenderedOnly,
    RenderedAndConverted,
    ConversionFailed { failure: ConversionFailure },
}

const RENDER_REASON_LIMIT: usize = 80;
const CONVERSION_REASON_LIMIT: usize = 50;

impl RecordOutcome {
    pub fn is_rendered(&self) -> bool {
        !matches!(self, RecordOutcome::RenderFailed { .. })
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, RecordOutcome::RenderedAndConverted)
    }

    /// Human readable status written to the audit report.
    pub fn status(&self) -> String {
        match self {
            RecordOutcome::RenderFailed { reason } => {
                format!("Error: {}", truncate_chars(reason, RENDER_REASON_LIMIT))
            }
            RecordOutcome::RenderedOnly => "Success".to_string(),
            RecordOutcome::RenderedAndConverted => "Success (PDF Created)".to_string(),
            RecordOutcome::ConversionFailed { failure } => match failure {
                ConversionFailure::NoOutput => {
                    "DOCX Created (PDF Failed - converter produced no output)".to_string()
                }
                ConversionFailure::Timeout => "DOCX Created (PDF Timeout)".to_string(),
                ConversionFailure::Error(reason) => format!(
                    "DOCX Created (PDF Error: {})",
                    truncate_chars(reason, CONVERSION_REASON_LIMIT)
                ),
            },
        }
    }
}

fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub name: String,
    pub status: String,
    #[serde(skip)]
    pub outcome: RecordOutcome,
}

impl AuditEntry {
    pub fn new(name: impl Into<String>, outcome: RecordOutcome) -> Self {
        Self {
            name: name.into(),
            status: outcome.status(),
            outcome,
        }
    }
}

/// A file destined for the archive, already read out of the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub archive_path: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total: usize,
    pub rendered: usize,
    pub converted: usize,
    pub conversion_requested: bool,
    pub elapsed: Duration,
    pub audit: Vec<AuditEntry>,
    pub artifacts: Vec<Artifact>,
}

impl BatchResult {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.total,
            rendered: self.rendered,
            converted: self.conversion_requested.then_some(self.converted),
            elapsed_secs: (self.elapsed.as_secs_f64() * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub rendered: usize,
    /// `None` when conversion was not requested.
    pub converted: Option<usize>,
    pub elapsed_secs: f64,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converted = match self.converted {
            Some(n) => n.to_string(),
            None => "N/A".to_string(),
        };
        write!(
            f,
            "Rows Processed: {} | DOCX Generated: {} | PDF Generated: {} | Time Taken: {:.2}s",
            self.total, self.rendered, converted, self.elapsed_secs
        )
    }
}

/// Snapshot handed to the progress sink after each record.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
    pub name: String,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_natural_string_form() {
        assert_eq!(CellValue::Float(50000.0).to_string(), "50000");
        assert_eq!(CellValue::Float(1250.5).to_string(), "1250.5");
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_record_text_trims_and_blanks_missing() {
        let mut record = Record::default();
        record
            .data
            .insert("employee_name".to_string(), CellValue::Text("  Asha Rao ".to_string()));
        record
            .data
            .insert("center_name".to_string(), CellValue::Text("   ".to_string()));

        assert_eq!(record.text("employee_name"), "Asha Rao");
        assert_eq!(record.text("center_name"), "");
        assert_eq!(record.text("not_a_column"), "");
    }

    #[test]
    fn test_status_strings_truncate_reasons() {
        let long = "x".repeat(200);
        let failed = RecordOutcome::RenderFailed { reason: long.clone() };
        assert_eq!(failed.status(), format!("Error: {}", "x".repeat(80)));

        let pdf = RecordOutcome::ConversionFailed {
            failure: ConversionFailure::Error(long),
        };
        assert_eq!(pdf.status(), format!("DOCX Created (PDF Error: {})", "x".repeat(50)));

        let timeout = RecordOutcome::ConversionFailed {
            failure: ConversionFailure::Timeout,
        };
        assert_eq!(timeout.status(), "DOCX Created (PDF Timeout)");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ñañaña", 3), "ñañ");
        assert_eq!(truncate_chars("short", 80), "short");
    }

    #[test]
    fn test_summary_reports_not_applicable_without_conversion() {
        let result = BatchResult {
            total: 2,
            rendered: 2,
            converted: 0,
            conversion_requested: false,
            elapsed: Duration::from_millis(1234),
            audit: vec![],
            artifacts: vec![],
        };
        let summary = result.summary();
        assert_eq!(summary.converted, None);
        assert_eq!(summary.elapsed_secs, 1.23);
        assert_eq!(
            summary.to_string(),
            "Rows Processed: 2 | DOCX Generated: 2 | PDF Generated: N/A | Time Taken: 1.23s"
        );
    }

    #[test]
    fn test_output_mode_flags() {
        assert!(!OutputMode::Docx.wants_conversion());
        assert!(OutputMode::Pdf.wants_conversion());
        assert!(!OutputMode::Pdf.keeps_documents());
        assert!(OutputMode::Both.wants_conversion() && OutputMode::Both.keeps_documents());
    }
}
