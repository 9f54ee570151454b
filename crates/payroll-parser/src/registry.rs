use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{CsvTableParser, WorkbookParser};
use crate::model::ParsedTable;

pub trait TabularParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &[u8]) -> Result<ParsedTable, ParserError>;
}

/// Decode an uploaded spreadsheet or CSV buffer, trying workbook formats first.
pub fn parse_tabular(content: &[u8]) -> Result<ParsedTable, ParserError> {
    let workbook = WorkbookParser;
    let csv_table = CsvTableParser;
    let parsers: [&dyn TabularParser; 2] = [&workbook, &csv_table];
    parse_with_parsers(content, &parsers)
}

pub fn parse_with_parsers(
    content: &[u8],
    parsers: &[&dyn TabularParser],
) -> Result<ParsedTable, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
