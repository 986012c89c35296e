use crate::domain::model::{Artifact, AuditEntry, BatchResult};
use crate::utils::error::Result;
use rust_xlsxwriter::{Format, Workbook};
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const DOCUMENTS_FOLDER: &str = "AppointmentLetter_Word";
pub const CONVERTED_FOLDER: &str = "AppointmentLetter_PDF";
pub const AUDIT_REPORT: &str = "Audit_Report.xlsx";
pub const DEFAULT_ARCHIVE_NAME: &str = "Appointment_Letters.zip";

/// Reads every file in `dir` into memory, sorted by name, under `folder/` in the archive.
pub fn collect_artifacts(dir: &Path, folder: &str) -> Result<Vec<Artifact>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        artifacts.push(Artifact {
            archive_path: format!("{}/{}", folder, file_name),
            bytes: std::fs::read(&path)?,
        });
    }

    Ok(artifacts)
}

/// One-sheet workbook with a `Name` / `Status` row per audit entry.
pub fn audit_report(entries: &[AuditEntry]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    sheet.write_string_with_format(0, 0, "Name", &header)?;
    sheet.write_string_with_format(0, 1, "Status", &header)?;
    sheet.set_column_width(0, 32)?;
    sheet.set_column_width(1, 60)?;

    for (i, entry) in entries.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, entry.name.as_str())?;
        sheet.write_string(row, 1, entry.status.as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Builds the downloadable archive: letters, PDFs and the audit report.
pub fn package(result: &BatchResult) -> Result<Vec<u8>> {
    tracing::debug!(
        "Creating ZIP file with {} files",
        result.artifacts.len() + 1
    );

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for artifact in &result.artifacts {
        zip.start_file(artifact.archive_path.as_str(), options)?;
        zip.write_all(&artifact.bytes)?;
    }

    // 稽核報表一定要有，即使全部失敗
    zip.start_file(AUDIT_REPORT, options)?;
    zip.write_all(&audit_report(&result.audit)?)?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
