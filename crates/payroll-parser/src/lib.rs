pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use formats::serial_to_datetime;
pub use model::{Cell, ParsedTable, RawRow, TableFormat};
pub use registry::{parse_tabular, parse_with_parsers, TabularParser};

#[cfg(test)]
mod tests;
