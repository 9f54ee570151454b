use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::errors::ParserError;
use crate::model::{Cell, ParsedTable, RawRow, TableFormat};

const EMPTY_HEADER: &str = "__EMPTY";

/// Trim header names, name blank headers `__EMPTY` and suffix repeats with
/// `_1`, `_2`, ... so every column keeps a distinct key.
pub fn normalize_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for header in raw {
        let trimmed = header.trim();
        let base = if trimmed.is_empty() {
            EMPTY_HEADER
        } else {
            trimmed
        };

        let mut candidate = base.to_string();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}_{suffix}");
        }

        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

/// Type a raw text cell the way spreadsheet tools do on CSV import.
pub fn infer_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Cell::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Cell::Bool(false);
    }
    if looks_numeric(trimmed) {
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return Cell::Number(value);
            }
        }
    }
    Cell::Text(raw.to_string())
}

// Identifiers such as "007" keep their leading zeros as text.
fn looks_numeric(text: &str) -> bool {
    let digits = text.trim_start_matches(['-', '+']);
    let mut chars = digits.chars();
    match (chars.next(), chars.next()) {
        (Some('0'), Some(next)) if next.is_ascii_digit() => false,
        (Some(first), _) => first.is_ascii_digit() || first == '.',
        (None, _) => false,
    }
}

/// Convert a spreadsheet serial date (1900 date system) to a timestamp.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::try_milliseconds(millis)?)
}

/// Render a spreadsheet date-time cell as ISO text; time-only values
/// (serial below one day) become `HH:MM`.
pub(crate) fn serial_to_text(serial: f64) -> Cell {
    let Some(timestamp) = serial_to_datetime(serial) else {
        return Cell::Number(serial);
    };

    let has_seconds = timestamp.second() != 0;
    if serial < 1.0 {
        let pattern = if has_seconds { "%H:%M:%S" } else { "%H:%M" };
        return Cell::Text(timestamp.format(pattern).to_string());
    }

    if timestamp.time() == NaiveTime::MIN {
        Cell::Text(timestamp.format("%Y-%m-%d").to_string())
    } else {
        Cell::Text(timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

/// Pair every data row with the normalized headers, dropping fully blank rows.
///
/// Cells to the right of the last header get `__EMPTY` style keys so no
/// value is lost.
pub fn assemble_table(
    parser: &'static str,
    format: TableFormat,
    sheet_name: Option<String>,
    mut raw_headers: Vec<String>,
    rows: impl IntoIterator<Item = Vec<Cell>>,
) -> Result<ParsedTable, ParserError> {
    let rows: Vec<Vec<Cell>> = rows.into_iter().collect();
    let width = rows.iter().map(|cells| used_width(cells)).max().unwrap_or(0);
    if width > raw_headers.len() {
        raw_headers.resize(width, String::new());
    }
    let headers = normalize_headers(raw_headers);

    let mut parsed_rows = Vec::new();
    for cells in rows {
        let mut cells = cells.into_iter();
        let mut row = RawRow::with_capacity(headers.len());
        for header in &headers {
            row.insert(header.clone(), cells.next().unwrap_or(Cell::Empty));
        }
        if row.is_blank() {
            continue;
        }
        parsed_rows.push(row);
    }

    if parsed_rows.is_empty() {
        return Err(ParserError::EmptyData { parser });
    }

    Ok(ParsedTable {
        format,
        sheet_name,
        headers,
        rows: parsed_rows,
    })
}

// Columns up to and including the last non-empty cell.
fn used_width(cells: &[Cell]) -> usize {
    cells
        .iter()
        .rposition(|cell| !matches!(cell, Cell::Empty))
        .map_or(0, |last| last + 1)
}
