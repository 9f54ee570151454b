use csv::ReaderBuilder;

use super::common::{assemble_table, infer_cell};
use crate::errors::ParserError;
use crate::model::{Cell, ParsedTable, TableFormat};
use crate::registry::TabularParser;

const PARSER_NAME: &str = "csv_table";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Comma-separated text with a header row.
pub struct CsvTableParser;

impl TabularParser for CsvTableParser {
    fn name(&self) -> &'static str {
        PARSER_NAME
    }

    fn parse(&self, content: &[u8]) -> Result<ParsedTable, ParserError> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

        if content.contains(&0) {
            return Err(ParserError::FormatMismatch {
                parser: PARSER_NAME,
                reason: "buffer contains binary data".to_string(),
            });
        }
        if std::str::from_utf8(content).is_err() {
            return Err(ParserError::FormatMismatch {
                parser: PARSER_NAME,
                reason: "file contents were not valid UTF-8".to_string(),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content);

        let mut records = reader.records();
        let header_record = match records.next() {
            Some(record) => record.map_err(|source| ParserError::Csv {
                parser: PARSER_NAME,
                source,
            })?,
            None => return Err(ParserError::EmptyData { parser: PARSER_NAME }),
        };
        let headers: Vec<String> = header_record.iter().map(str::to_string).collect();

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for record in records {
            let record = record.map_err(|source| ParserError::Csv {
                parser: PARSER_NAME,
                source,
            })?;
            rows.push(record.iter().map(infer_cell).collect());
        }

        assemble_table(PARSER_NAME, TableFormat::Csv, None, headers, rows)
    }
}
