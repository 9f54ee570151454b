mod common;
mod csv_table;
mod workbook;

pub use common::{assemble_table, infer_cell, normalize_headers, serial_to_datetime};
pub use csv_table::CsvTableParser;
pub use workbook::WorkbookParser;
