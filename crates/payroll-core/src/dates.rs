//! Lenient date reading shared by the transformer, validator and reports.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use payroll_parser::{serial_to_datetime, Cell};
use serde_json::Value;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Accepts RFC 3339, ISO date-times and the common date spellings. Values
/// without an offset are taken as UTC.
pub fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    None
}

/// Text is parsed, numbers are spreadsheet serial dates.
pub fn parse_date_cell(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::Text(text) => parse_date_text(text),
        Cell::Number(serial) => serial_to_datetime(*serial).map(|naive| naive.and_utc()),
        Cell::Bool(_) | Cell::Empty => None,
    }
}

pub fn parse_date_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_date_text(text),
        Value::Number(number) => number
            .as_f64()
            .and_then(serial_to_datetime)
            .map(|naive| naive.and_utc()),
        _ => None,
    }
}
