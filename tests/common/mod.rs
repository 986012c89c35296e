#![allow(dead_code)]

use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx};
use letter_merge::core::Converter;
use letter_merge::domain::schema::REQUIRED_FIELDS;
use letter_merge::{OutputMode, TomlConfig};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use zip::write::SimpleFileOptions;

/// Minimal Word package whose body is a single paragraph per line.
pub fn docx_template(lines: &[&str]) -> Vec<u8> {
    let paragraphs: String = lines
        .iter()
        .map(|line| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", line))
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        paragraphs
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Writes a CSV carrying every required header. Unlisted cells get a
/// plausible default; `overrides` set per-row values by column.
pub fn write_dataset(dir: &Path, rows: &[Vec<(&str, &str)>]) -> PathBuf {
    write_dataset_with_columns(dir, &REQUIRED_FIELDS, rows)
}

pub fn write_dataset_with_columns(
    dir: &Path,
    columns: &[&str],
    rows: &[Vec<(&str, &str)>],
) -> PathBuf {
    let path = dir.join("employees.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(columns).unwrap();

    for overrides in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|column| {
                overrides
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| default_cell(column))
            })
            .collect();
        writer.write_record(&values).unwrap();
    }

    writer.flush().unwrap();
    path
}

fn default_cell(column: &str) -> String {
    match column {
        "appointment_date" => "2024-02-20".to_string(),
        "joining_date" => "2024-03-05".to_string(),
        "date_of_birth" => "1998-11-30".to_string(),
        "employee_name" => "Asha Rao".to_string(),
        "employee_first_name" => "Asha".to_string(),
        "employee_city" | "posting_city" => "Pune".to_string(),
        "designation" => "Analyst".to_string(),
        "center_name" => "Hinjewadi".to_string(),
        _ => "1000".to_string(),
    }
}

pub fn write_template(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("appointment.docx");
    std::fs::write(&path, docx_template(lines)).unwrap();
    path
}

/// Job configuration pointing at files inside a test directory.
pub fn job(dataset: &Path, template: &Path, output: &Path, mode: OutputMode) -> TomlConfig {
    let content = format!(
        r#"
[job]
name = "integration"

[input]
dataset = '{}'
template = '{}'

[output]
path = '{}'
mode = "{}"

[conversion]
timeout_seconds = 1
"#,
        dataset.display(),
        template.display(),
        output.display(),
        match mode {
            OutputMode::Docx => "docx",
            OutputMode::Pdf => "pdf",
            OutputMode::Both => "both",
        }
    );
    TomlConfig::from_toml_str(&content).unwrap()
}

/// Every archive entry by name.
pub fn archive_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        entries.insert(file.name().to_string(), content);
    }
    entries
}

/// `(name, status)` rows of an audit workbook, header excluded.
pub fn audit_rows(workbook: &[u8]) -> Vec<(String, String)> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(workbook.to_vec())).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range
        .rows()
        .skip(1)
        .map(|row| {
            let text = |cell: Option<&Data>| match cell {
                Some(Data::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            (text(row.first()), text(row.get(1)))
        })
        .collect()
}

/// Text of `word/document.xml` inside a rendered letter.
pub fn document_xml(docx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx.to_vec())).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

/// Writes `<stem>.pdf` next to where LibreOffice would.
pub struct WritesPdf;

#[async_trait]
impl Converter for WritesPdf {
    async fn convert(&self, input: &Path, out_dir: &Path) -> std::io::Result<()> {
        let stem = input.file_stem().unwrap().to_string_lossy().to_string();
        std::fs::write(out_dir.join(format!("{}.pdf", stem)), b"%PDF-1.7")
    }
}

/// Never returns within any test timeout.
pub struct Hangs;

#[async_trait]
impl Converter for Hangs {
    async fn convert(&self, _input: &Path, _out_dir: &Path) -> std::io::Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}
