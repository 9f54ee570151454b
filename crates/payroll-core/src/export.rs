use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::{PayrollError, Result, UnknownVariant};
use crate::reports::allowance_report;
use crate::schema::schema_for;
use crate::sheet::{render, OutputFormat, Sheet};
use crate::store::{DocumentStore, StoreError};
use crate::types::ImportableType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Employees,
    Attendance,
    Allowances,
    MasterData,
    CompleteBackup,
    AllowanceReport,
}

impl ExportKind {
    pub const ALL: [ExportKind; 6] = [
        ExportKind::Employees,
        ExportKind::Attendance,
        ExportKind::Allowances,
        ExportKind::MasterData,
        ExportKind::CompleteBackup,
        ExportKind::AllowanceReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Employees => "employees",
            ExportKind::Attendance => "attendance",
            ExportKind::Allowances => "allowances",
            ExportKind::MasterData => "master-data",
            ExportKind::CompleteBackup => "complete-backup",
            ExportKind::AllowanceReport => "allowance-report",
        }
    }

    /// Composite kinds span several sheets and are always written as workbooks.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            ExportKind::MasterData | ExportKind::CompleteBackup | ExportKind::AllowanceReport
        )
    }

    /// Collections fetched for this kind, in sheet order.
    pub fn sources(&self) -> &'static [CollectionSource] {
        match self {
            ExportKind::Employees => &EMPLOYEES,
            ExportKind::Attendance => &ATTENDANCE,
            ExportKind::Allowances => &ALLOWANCES,
            ExportKind::MasterData => &MASTER_DATA,
            ExportKind::CompleteBackup => &COMPLETE_BACKUP,
            ExportKind::AllowanceReport => &[],
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        ExportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownVariant::new("export kind", value))
    }
}

/// One store collection rendered as one named sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSource {
    pub sheet: &'static str,
    pub collection: &'static str,
    pub order_by: Option<&'static str>,
}

const fn source(
    sheet: &'static str,
    collection: &'static str,
    order_by: Option<&'static str>,
) -> CollectionSource {
    CollectionSource {
        sheet,
        collection,
        order_by,
    }
}

const EMPLOYEES: [CollectionSource; 1] = [source("employees", "employees", None)];
const ATTENDANCE: [CollectionSource; 1] = [source("attendance", "attendance", Some("date"))];
const ALLOWANCES: [CollectionSource; 1] = [source("allowances", "allowances", Some("date"))];

const MASTER_DATA: [CollectionSource; 5] = [
    source("Companies", "companies", None),
    source("Units", "units", None),
    source("Groups", "groups", None),
    source("Shifts", "shifts", None),
    source("Holidays", "holidays", None),
];

const COMPLETE_BACKUP: [CollectionSource; 8] = [
    source("Employees", "employees", None),
    source("Attendance", "attendance", Some("date")),
    source("Allowances", "allowances", Some("date")),
    source("Companies", "companies", None),
    source("Units", "units", None),
    source("Groups", "groups", None),
    source("Shifts", "shifts", None),
    source("Holidays", "holidays", None),
];

/// A rendered file ready to be saved or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub async fn export_today(
    kind: ExportKind,
    store: &dyn DocumentStore,
    format: OutputFormat,
) -> Result<ExportFile> {
    export(kind, store, format, Utc::now().date_naive()).await
}

/// Serialize the collections behind `kind` as-is. `date` goes into the file name.
pub async fn export(
    kind: ExportKind,
    store: &dyn DocumentStore,
    format: OutputFormat,
    date: NaiveDate,
) -> Result<ExportFile> {
    if kind.is_composite() && format != OutputFormat::Xlsx {
        return Err(PayrollError::UnsupportedFormat {
            kind: kind.as_str(),
            format: format.extension(),
        });
    }

    if kind == ExportKind::AllowanceReport {
        return allowance_report(store).await;
    }

    let sheets = fetch_sheets(store, kind.sources()).await?;
    let bytes = render(&sheets, format)?;
    let filename = format!("{kind}-{}.{}", date.format("%Y-%m-%d"), format.extension());

    info!(kind = %kind, filename = %filename, sheets = sheets.len(), "export written");
    Ok(ExportFile { filename, bytes })
}

/// Fetch every source concurrently; the first failure fails the whole export.
pub async fn fetch_sheets(
    store: &dyn DocumentStore,
    sources: &[CollectionSource],
) -> std::result::Result<Vec<Sheet>, StoreError> {
    let fetches = sources.iter().map(|source| async move {
        let documents = store.get_all(source.collection, source.order_by).await?;
        debug!(
            collection = source.collection,
            count = documents.len(),
            "fetched collection for export"
        );
        Ok::<_, StoreError>(Sheet::from_documents(source.sheet, &documents))
    });

    try_join_all(fetches).await
}

/// The sample record of `import_type` as a one-row sheet named `Template`.
pub fn template(import_type: ImportableType, format: OutputFormat) -> Result<ExportFile> {
    let schema = schema_for(import_type);
    let sheet = Sheet::from_rows("Template", std::slice::from_ref(&schema.sample));
    let bytes = render(std::slice::from_ref(&sheet), format)?;

    Ok(ExportFile {
        filename: format!("{import_type}-template.{}", format.extension()),
        bytes,
    })
}
