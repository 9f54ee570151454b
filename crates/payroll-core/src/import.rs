use chrono::Utc;
use payroll_parser::{parse_tabular, RawRow, TableFormat};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::store::DocumentStore;
use crate::transform::transform_at;
use crate::types::ImportableType;
use crate::validation::{validate_with, ValidationOutcome};

const ABORTED_MESSAGE: &str = "Failed to process import";
const SHOWN_ERRORS: usize = 10;
const SHOWN_WARNINGS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Reject holiday rows whose date cannot be read instead of storing a null date.
    pub strict_dates: bool,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub success: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportResult {
    /// The result reported when the store fails underneath a run.
    pub fn aborted() -> Self {
        Self {
            success: 0,
            errors: vec![ABORTED_MESSAGE.to_string()],
            warnings: Vec::new(),
        }
    }

    /// The store became unavailable during the run; rows counted in
    /// `success` were persisted before that.
    pub fn is_aborted(&self) -> bool {
        self.errors.iter().any(|message| message == ABORTED_MESSAGE)
    }

    /// Human-readable summary, truncated the way the import screen shows it.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} records imported successfully", self.success)];

        if !self.errors.is_empty() {
            lines.push(format!("Errors ({})", self.errors.len()));
            lines.extend(
                self.errors
                    .iter()
                    .take(SHOWN_ERRORS)
                    .map(|message| format!("• {message}")),
            );
            if self.errors.len() > SHOWN_ERRORS {
                lines.push(format!(
                    "... and {} more errors",
                    self.errors.len() - SHOWN_ERRORS
                ));
            }
        }

        if !self.warnings.is_empty() {
            lines.push(format!("Warnings ({})", self.warnings.len()));
            lines.extend(
                self.warnings
                    .iter()
                    .take(SHOWN_WARNINGS)
                    .map(|message| format!("• {message}")),
            );
        }

        lines
    }
}

/// Persist every valid row, one at a time, in input order.
///
/// A rejected row becomes a warning and the run continues. An unavailable
/// store abandons the run: before any row is persisted the result is
/// [`ImportResult::aborted`], afterwards it keeps the persisted count and
/// warnings and appends the abort message to the errors.
pub async fn run_import(
    store: &dyn DocumentStore,
    import_type: ImportableType,
    outcome: ValidationOutcome,
) -> ImportResult {
    let collection = import_type.collection();
    let errors = outcome.error_messages();
    let now = Utc::now();

    let mut success = 0;
    let mut warnings = Vec::new();

    for row in &outcome.valid {
        let document = match transform_at(row, import_type, now).to_document() {
            Ok(document) => document,
            Err(err) => {
                warn!(collection, error = %err, "row could not be serialized");
                warnings.push(failed_row_warning(row));
                continue;
            }
        };

        match store.create(collection, document).await {
            Ok(_) => success += 1,
            Err(err) if err.is_unavailable() => {
                error!(collection, error = %err, imported = success, "import aborted");
                if success == 0 {
                    return ImportResult::aborted();
                }
                let mut errors = errors;
                errors.push(ABORTED_MESSAGE.to_string());
                return ImportResult {
                    success,
                    errors,
                    warnings,
                };
            }
            Err(err) => {
                warn!(collection, error = %err, "row rejected by store");
                warnings.push(failed_row_warning(row));
            }
        }
    }

    ImportResult {
        success,
        errors,
        warnings,
    }
}

fn failed_row_warning(row: &RawRow) -> String {
    let json = serde_json::to_string(row).unwrap_or_else(|_| "{}".to_string());
    format!("Failed to import row: {json}")
}

/// An uploaded file that has been parsed but not yet imported. Dropping it
/// resets the session.
#[derive(Debug, Clone)]
pub struct ImportPreview {
    pub import_type: ImportableType,
    pub format: TableFormat,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// BLAKE3 hex digest of the uploaded bytes.
    pub source_digest: String,
}

impl ImportPreview {
    pub fn from_bytes(import_type: ImportableType, content: &[u8]) -> Result<Self> {
        let source_digest = blake3::hash(content).to_hex().to_string();
        let table = parse_tabular(content)?;

        info!(
            import_type = %import_type,
            format = %table.format,
            rows = table.rows.len(),
            source_digest = %source_digest,
            "parsed upload"
        );

        Ok(Self {
            import_type,
            format: table.format,
            headers: table.headers,
            rows: table.rows,
            source_digest,
        })
    }

    pub fn preview(&self, limit: usize) -> &[RawRow] {
        &self.rows[..self.rows.len().min(limit)]
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn validate(&self, options: &ImportOptions) -> ValidationOutcome {
        validate_with(&self.rows, self.import_type, options)
    }

    pub async fn import(self, store: &dyn DocumentStore, options: &ImportOptions) -> ImportResult {
        let outcome = self.validate(options);
        info!(
            import_type = %self.import_type,
            source_digest = %self.source_digest,
            valid = outcome.valid.len(),
            invalid = outcome.errors.len(),
            "starting import"
        );

        let result = run_import(store, self.import_type, outcome).await;
        info!(
            import_type = %self.import_type,
            source_digest = %self.source_digest,
            success = result.success,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "import finished"
        );
        result
    }
}

/// Parse, validate and persist an uploaded file in one go.
pub async fn import_file(
    content: &[u8],
    import_type: ImportableType,
    store: &dyn DocumentStore,
    options: &ImportOptions,
) -> Result<ImportResult> {
    let preview = ImportPreview::from_bytes(import_type, content)?;
    Ok(preview.import(store, options).await)
}
