use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use payroll_core::config::Settings;
use payroll_core::db::{self, PgDocumentStore};
use payroll_core::export::export_today;
use payroll_core::schema::all_schemas;
use payroll_core::{
    template, ExportKind, ImportOptions, ImportPreview, ImportableType, MemoryStore, OutputFormat,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod tables;

#[derive(Parser, Debug)]
#[command(author, version, about = "Payroll bulk import/export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run database migrations
    Migrate,
    /// List the importable types and their required columns
    Types,
    /// Write the sample template for an importable type
    Template(TemplateArgs),
    /// Parse a file and show its first rows without importing
    Preview(PreviewArgs),
    /// Validate and import a file
    Import(ImportArgs),
    /// Export collections to a workbook
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct TemplateArgs {
    /// employees, companies, shifts or holidays
    import_type: ImportableType,
    #[arg(long, default_value_t = OutputFormat::Xlsx)]
    format: OutputFormat,
    /// Output directory (defaults to PAYROLL_EXPORT_DIR)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    import_type: ImportableType,
    file: PathBuf,
    #[arg(long, default_value_t = 5)]
    rows: usize,
}

#[derive(Args, Debug)]
struct ImportArgs {
    import_type: ImportableType,
    file: PathBuf,
    /// Validate and transform against an in-memory store only
    #[arg(long)]
    dry_run: bool,
    /// Reject holiday rows whose date cannot be read
    #[arg(long)]
    strict_dates: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// employees, attendance, allowances, master-data, complete-backup or allowance-report
    kind: ExportKind,
    #[arg(long, default_value_t = OutputFormat::Xlsx)]
    format: OutputFormat,
    /// Output directory (defaults to PAYROLL_EXPORT_DIR)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Migrate => {
            let pool = connect_pool(&settings).await?;
            db::run_migrations(&pool).await?;
            info!("Database migrations applied");
            Ok(())
        }
        Command::Types => {
            println!("{}", tables::schema_table(all_schemas()));
            Ok(())
        }
        Command::Template(args) => {
            let file = template(args.import_type, args.format)?;
            let dir = args.out.unwrap_or_else(|| settings.export_dir.clone());
            let path = file
                .save_in(&dir)
                .with_context(|| format!("failed to write template to {}", dir.display()))?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Preview(args) => {
            let preview = load_preview(args.import_type, &args.file).await?;
            println!(
                "{} rows read from {} ({})",
                preview.row_count(),
                args.file.display(),
                preview.format
            );
            println!("{}", tables::preview_table(&preview.headers, preview.preview(args.rows)));

            let outcome = preview.validate(&ImportOptions {
                strict_dates: settings.strict_dates,
            });
            println!(
                "{} valid, {} with errors",
                outcome.valid.len(),
                outcome.errors.len()
            );
            Ok(())
        }
        Command::Import(args) => {
            let preview = load_preview(args.import_type, &args.file).await?;
            let options = ImportOptions {
                strict_dates: args.strict_dates || settings.strict_dates,
            };

            let result = if args.dry_run {
                warn!("Dry run: nothing will be persisted");
                let store = MemoryStore::new();
                preview.import(&store, &options).await
            } else {
                let store = PgDocumentStore::new(connect_pool(&settings).await?);
                preview.import(&store, &options).await
            };

            println!("{}", tables::result_table(&result));
            if result.is_aborted() {
                anyhow::bail!("import aborted: document store unavailable");
            }
            Ok(())
        }
        Command::Export(args) => {
            let store = PgDocumentStore::new(connect_pool(&settings).await?);
            let file = export_today(args.kind, &store, args.format).await?;
            let dir = args.out.unwrap_or_else(|| settings.export_dir.clone());
            let path = file
                .save_in(&dir)
                .with_context(|| format!("failed to write export to {}", dir.display()))?;
            info!(kind = %args.kind, path = %path.display(), "Export written");
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn connect_pool(settings: &Settings) -> Result<db::DbPool> {
    let database_url = settings.require_database_url()?;
    db::connect(database_url, settings.max_connections).await
}

async fn load_preview(import_type: ImportableType, file: &Path) -> Result<ImportPreview> {
    let content = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let preview = ImportPreview::from_bytes(import_type, &content).map_err(|err| {
        if err.is_empty_file() {
            anyhow::anyhow!("{} contains no data rows", file.display())
        } else {
            anyhow::Error::new(err).context(format!("failed to parse {}", file.display()))
        }
    })?;
    Ok(preview)
}
