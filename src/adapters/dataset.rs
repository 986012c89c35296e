use crate::domain::model::{CellValue, Dataset, Record};
use crate::utils::error::{LetterError, Result};
use calamine::{Data, DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::io::Cursor;
use std::path::Path;

pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "csv"];

/// Loads the employee table from an `.xlsx` workbook (first sheet) or a `.csv` file.
///
/// The first row is the header. Rows where every cell is blank are skipped.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let bytes = std::fs::read(path)?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

    match extension.as_str() {
        "xlsx" => read_xlsx(bytes),
        "csv" => read_csv(&bytes),
        other => Err(LetterError::InvalidConfigValueError {
            field: "dataset".to_string(),
            value: path.display().to_string(),
            reason: format!(
                "Unsupported data file type '{}'. Allowed extensions: {}",
                other,
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        }),
    }
}

pub fn read_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut dataset = Dataset {
        columns,
        ..Dataset::default()
    };

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        // 標題在第 1 行
        let row_number = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);
        let cells: Vec<CellValue> = (0..dataset.columns.len())
            .map(|i| match row.get(i) {
                Some(s) if !s.trim().is_empty() => CellValue::Text(s.to_string()),
                _ => CellValue::Empty,
            })
            .collect();
        push_row(&mut dataset, row_number, cells);
    }

    Ok(dataset)
}

pub fn read_xlsx(bytes: Vec<u8>) -> Result<Dataset> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LetterError::ProcessingError {
            message: "workbook has no worksheets".to_string(),
        })??;

    // 工作表列號從 1 起算，範圍不一定從第 1 列開始
    let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(header_name).collect(),
        None => return Ok(Dataset::default()),
    };
    let mut dataset = Dataset {
        columns,
        ..Dataset::default()
    };

    for (index, row) in rows.enumerate() {
        let cells: Vec<CellValue> = (0..dataset.columns.len())
            .map(|i| row.get(i).map(cell_value).unwrap_or(CellValue::Empty))
            .collect();
        push_row(&mut dataset, header_row + 1 + index, cells);
    }

    Ok(dataset)
}

/// Adds one data row, or notes its row number when every cell is blank.
fn push_row(dataset: &mut Dataset, row_number: usize, cells: Vec<CellValue>) {
    if cells.iter().all(CellValue::is_empty) {
        tracing::debug!("Skipping blank row {}", row_number);
        dataset.skipped_rows.push(row_number);
        return;
    }

    let mut record = Record::default();
    for (column, value) in dataset.columns.iter().zip(cells) {
        record.data.insert(column.clone(), value);
    }
    dataset.records.push(record);
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => cell_value(other).to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => match cell.as_f64().and_then(serial_to_datetime) {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        // #N/A 之類的錯誤格當作空白
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
