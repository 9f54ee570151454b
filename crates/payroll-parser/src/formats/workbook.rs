use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::common::{assemble_table, serial_to_text};
use crate::errors::ParserError;
use crate::model::{Cell, ParsedTable, TableFormat};
use crate::registry::TabularParser;

const PARSER_NAME: &str = "workbook";

// Zip container (xlsx, xlsm, xlsb, ods) and OLE compound file (xls).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Spreadsheet workbooks; only the first sheet is read.
pub struct WorkbookParser;

impl TabularParser for WorkbookParser {
    fn name(&self) -> &'static str {
        PARSER_NAME
    }

    fn parse(&self, content: &[u8]) -> Result<ParsedTable, ParserError> {
        if !content.starts_with(ZIP_MAGIC) && !content.starts_with(OLE_MAGIC) {
            return Err(ParserError::FormatMismatch {
                parser: PARSER_NAME,
                reason: "not a spreadsheet container".to_string(),
            });
        }

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(content)).map_err(|err| {
            ParserError::FormatMismatch {
                parser: PARSER_NAME,
                reason: format!("failed to open workbook: {err}"),
            }
        })?;

        let sheet_name = workbook.sheet_names().first().cloned();
        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(err)) => {
                return Err(ParserError::Workbook {
                    parser: PARSER_NAME,
                    message: format!("failed to read first sheet: {err}"),
                })
            }
            None => {
                return Err(ParserError::Workbook {
                    parser: PARSER_NAME,
                    message: "workbook contains no sheets".to_string(),
                })
            }
        };

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Err(ParserError::EmptyData { parser: PARSER_NAME });
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|data| convert_cell(data).to_string())
            .collect();

        let data_rows: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        assemble_table(
            PARSER_NAME,
            TableFormat::Workbook,
            sheet_name,
            headers,
            data_rows,
        )
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) if text.is_empty() => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(flag) => Cell::Bool(*flag),
        Data::DateTime(datetime) => serial_to_text(datetime.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
    }
}
