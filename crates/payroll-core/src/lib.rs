pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod reports;
pub mod schema;
pub mod sheet;
pub mod store;
pub mod transform;
pub mod types;
pub mod validation;

pub use payroll_parser::{Cell, ParsedTable, RawRow};
pub use error::{PayrollError, Result};
pub use export::{export, template, ExportFile, ExportKind};
pub use import::{import_file, run_import, ImportOptions, ImportPreview, ImportResult};
pub use sheet::OutputFormat;
pub use store::{Document, DocumentStore, MemoryStore, StoreError};
pub use types::ImportableType;
pub use validation::{validate, RowError, ValidationOutcome};
