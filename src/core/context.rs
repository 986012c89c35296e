use crate::domain::model::{CellValue, Record, RenderContext};
use crate::domain::schema::FieldSchema;
use crate::utils::error::DateFormatError;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

// NN-NN-YYYY 與 NN/NN/YYYY 先視為月在前；第一個數字大於 12 時才退回日在前
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Builds the substitution map for one record.
///
/// Every dataset column is included, not only the required ones. Date fields
/// that hold a value are re-read from the original cell and written as
/// `DD-MM-YYYY`; blank date fields stay blank and are never parsed.
pub fn build_context(
    record: &Record,
    columns: &[String],
    schema: &FieldSchema,
) -> Result<RenderContext, DateFormatError> {
    let mut context = RenderContext::new();

    for column in columns {
        let text = record.text(column);

        if !text.is_empty() && schema.is_date_field(column) {
            let date = interpret_date(record.get(column)).ok_or_else(|| DateFormatError {
                field: column.clone(),
                value: text.clone(),
            })?;
            context.insert(column.as_str(), date.format("%d-%m-%Y").to_string());
        } else {
            context.insert(column.as_str(), text);
        }
    }

    Ok(context)
}

pub fn interpret_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Int(days) => serial_to_date(*days as f64),
        CellValue::Float(days) => serial_to_date(*days),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

/// Spreadsheet serial day number (1900 date system) to a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}
