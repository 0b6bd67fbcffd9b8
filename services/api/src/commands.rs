use crate::infra::open_sqlite_store;
use clap::Args;
use kindness_registry::config::{AppConfig, ConfigError};
use kindness_registry::error::AppError;
use kindness_registry::registry::{
    read_rows_from_path, Position, RegistryError, RegistryService, SqlitePositionStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV export with one header line followed by position rows
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// SQLite database file (defaults to REGISTRY_DATABASE)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Only list records whose name contains this text
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// SQLite database file (defaults to REGISTRY_DATABASE)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs { csv, database } = args;
    let service = offline_service(database)?;

    let rows = read_rows_from_path(&csv)?;
    let total = rows.len();
    match service.import(rows) {
        Ok(imported) => {
            println!("Imported {imported} of {total} rows from {}", csv.display());
            Ok(())
        }
        Err(RegistryError::Validation(report)) => {
            println!("Import rejected; nothing was saved:");
            for message in report.messages() {
                println!("  - {message}");
            }
            Err(RegistryError::Validation(report).into())
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let ListArgs { search, database } = args;
    let service = offline_service(database)?;

    let positions = service.search(search.as_deref())?;
    println!("{}", render_listing(&positions)?);
    Ok(())
}

fn render_listing(positions: &[Position]) -> Result<String, AppError> {
    let json = serde_json::to_string_pretty(positions).map_err(std::io::Error::from)?;
    Ok(json)
}

fn offline_service(
    database: Option<PathBuf>,
) -> Result<RegistryService<SqlitePositionStore>, AppError> {
    let mut registry = AppConfig::load()?.registry;
    if database.is_some() {
        registry.database = database;
    }
    let path = registry
        .database
        .clone()
        .ok_or(ConfigError::MissingDatabase)?;

    let store = open_sqlite_store(&path)?;
    Ok(RegistryService::new(Arc::new(store), registry.settings()))
}
