use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum PayrollError {
    #[error("Failed to read file: {0}")]
    Parse(#[from] payroll_parser::ParserError),

    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    #[error("Workbook serialization failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),

    #[error("{kind} export cannot be written as {format}")]
    UnsupportedFormat {
        kind: &'static str,
        format: &'static str,
    },

    #[error("Sheet '{sheet}' has too many columns ({columns})")]
    SheetTooWide { sheet: String, columns: usize },

    #[error("Sheet '{sheet}' has too many rows ({rows})")]
    SheetTooLong { sheet: String, rows: usize },
}

impl PayrollError {
    /// The upload decoded but held no data rows.
    pub fn is_empty_file(&self) -> bool {
        matches!(self, PayrollError::Parse(err) if err.is_empty_file())
    }
}

/// A user-supplied name that does not match any known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PayrollError>;
