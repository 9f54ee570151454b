use std::fmt;

use payroll_parser::{Cell, RawRow};

use crate::dates::parse_date_cell;
use crate::import::ImportOptions;
use crate::schema::schema_for;
use crate::types::{EmployeeType, ImportableType, Vocabulary};

/// Spreadsheet row number of the first data row (row 1 holds the headers).
const FIRST_DATA_ROW: usize = 2;

/// Every problem found in one source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub messages: Vec<String>,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.messages.join(", "))
    }
}

/// Partition of the input rows: a row lands in `errors` as soon as it has
/// one message, otherwise in `valid`, unchanged.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: Vec<RawRow>,
    pub errors: Vec<RowError>,
}

impl ValidationOutcome {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(RowError::to_string).collect()
    }

    pub fn total_rows(&self) -> usize {
        self.valid.len() + self.errors.len()
    }
}

pub fn validate(rows: &[RawRow], import_type: ImportableType) -> ValidationOutcome {
    validate_with(rows, import_type, &ImportOptions::default())
}

pub fn validate_with(
    rows: &[RawRow],
    import_type: ImportableType,
    options: &ImportOptions,
) -> ValidationOutcome {
    let schema = schema_for(import_type);
    let mut outcome = ValidationOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        let mut messages: Vec<String> = schema
            .required_fields
            .iter()
            .copied()
            .filter(|field| row.value(field).is_none())
            .map(|field| format!("Missing required field: {field}"))
            .collect();

        match import_type {
            ImportableType::Employees => check_employee(row, &mut messages),
            ImportableType::Shifts => check_shift(row, &mut messages),
            ImportableType::Holidays if options.strict_dates => check_holiday(row, &mut messages),
            ImportableType::Holidays | ImportableType::Companies => {}
        }

        if messages.is_empty() {
            outcome.valid.push(row.clone());
        } else {
            outcome.errors.push(RowError {
                row: index + FIRST_DATA_ROW,
                messages,
            });
        }
    }

    outcome
}

fn check_employee(row: &RawRow, messages: &mut Vec<String>) {
    if let Some(cell) = row.value("employeeType") {
        let known = cell.as_text().and_then(EmployeeType::parse).is_some();
        if !known {
            messages.push("Employee type must be staff or labour".to_string());
        }
    }

    if let Some(cell) = row.value("salaryPerDay") {
        if cell.as_number().is_none() {
            messages.push("Salary per day must be a number".to_string());
        }
    }
}

fn check_shift(row: &RawRow, messages: &mut Vec<String>) {
    if let Some(cell) = row.value("startTime") {
        if !is_clock_time(cell) {
            messages.push("Start time must be in HH:MM format".to_string());
        }
    }
    if let Some(cell) = row.value("endTime") {
        if !is_clock_time(cell) {
            messages.push("End time must be in HH:MM format".to_string());
        }
    }
}

fn check_holiday(row: &RawRow, messages: &mut Vec<String>) {
    if let Some(cell) = row.value("date") {
        if parse_date_cell(cell).is_none() {
            messages.push("Date must be a valid date".to_string());
        }
    }
}

/// Exactly two-digit hours and minutes on a 24-hour clock.
fn is_clock_time(cell: &Cell) -> bool {
    let Some(text) = cell.as_text() else {
        return false;
    };
    let bytes = text.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hours = (digits[0] - b'0') * 10 + (digits[1] - b'0');
    let minutes = (digits[2] - b'0') * 10 + (digits[3] - b'0');
    hours < 24 && minutes < 60
}
