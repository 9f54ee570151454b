//! Named sheets of JSON values and their `.xlsx` / `.csv` renderings.

use std::fmt;
use std::str::FromStr;

use payroll_parser::{Cell, RawRow};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;

use crate::error::{PayrollError, Result, UnknownVariant};
use crate::store::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(UnknownVariant::new("output format", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Documents as-is; the header is the union of their keys in first-seen order.
    pub fn from_documents(name: impl Into<String>, documents: &[Document]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for document in documents {
            for key in document.keys() {
                if !headers.iter().any(|header| header == key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = documents
            .iter()
            .map(|document| {
                headers
                    .iter()
                    .map(|header| document.get(header).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn from_rows(name: impl Into<String>, rows: &[RawRow]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !headers.iter().any(|header| header == key) {
                    headers.push(key.to_string());
                }
            }
        }

        let rows = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|header| row.get(header).map_or(Value::Null, cell_value))
                    .collect()
            })
            .collect();

        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn push_blank_row(&mut self) {
        self.rows.push(Vec::new());
    }
}

fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Text(text) => Value::String(text.clone()),
        Cell::Number(number) => serde_json::Number::from_f64(*number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Cell::Bool(flag) => Value::Bool(*flag),
        Cell::Empty => Value::Null,
    }
}

pub fn render(sheets: &[Sheet], format: OutputFormat) -> Result<Vec<u8>> {
    match (format, sheets) {
        (OutputFormat::Xlsx, _) => write_xlsx(sheets),
        (OutputFormat::Csv, [sheet]) => write_csv(sheet),
        (OutputFormat::Csv, _) => Err(PayrollError::UnsupportedFormat {
            kind: "multi-sheet",
            format: "csv",
        }),
    }
}

/// One worksheet per sheet, in order.
pub fn write_xlsx(sheets: &[Sheet]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Worksheet row for the data row at `index`; row 0 holds the headers.
fn sheet_row(sheet: &Sheet, index: usize) -> Result<u32> {
    index
        .checked_add(1)
        .and_then(|row| u32::try_from(row).ok())
        .ok_or_else(|| PayrollError::SheetTooLong {
            sheet: sheet.name.clone(),
            rows: sheet.rows.len(),
        })
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    let too_wide = || PayrollError::SheetTooWide {
        sheet: sheet.name.clone(),
        columns: sheet.headers.len(),
    };

    for (col, header) in sheet.headers.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| too_wide())?;
        worksheet.write_string(0, col, header)?;
    }

    for (index, values) in sheet.rows.iter().enumerate() {
        let row = sheet_row(sheet, index)?;
        for (col, value) in values.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| too_wide())?;
            match value {
                Value::Null => {}
                Value::Bool(flag) => {
                    worksheet.write_boolean(row, col, *flag)?;
                }
                Value::Number(number) => match number.as_f64() {
                    Some(number) => {
                        worksheet.write_number(row, col, number)?;
                    }
                    None => {
                        worksheet.write_string(row, col, number.to_string())?;
                    }
                },
                Value::String(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                nested => {
                    worksheet.write_string(row, col, nested.to_string())?;
                }
            }
        }
    }

    Ok(())
}

pub fn write_csv(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(&sheet.headers)?;
    for values in &sheet.rows {
        if values.is_empty() {
            writer.write_record([""])?;
            continue;
        }
        writer.write_record(values.iter().map(value_text))?;
    }

    writer
        .into_inner()
        .map_err(|err| PayrollError::Io(err.into_error()))
}

/// Plain-text rendering of a JSON value for one spreadsheet cell.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => match number.as_f64() {
            Some(number) => format_number(number),
            None => number.to_string(),
        },
        Value::String(text) => text.clone(),
        nested => nested.to_string(),
    }
}

pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
