use std::io::Read;
use std::path::Path;

use super::domain::ImportRow;

/// Failure to read an operator spreadsheet export.
#[derive(Debug, thiserror::Error)]
pub enum RowLoadError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid import CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Read import rows from a CSV export with a single header line.
///
/// Cells are trimmed and empty cells become `None`; field rules are left to
/// the import validator so every problem is reported per row.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>, RowLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<ImportRow>() {
        rows.push(record?);
    }

    Ok(rows)
}

pub fn read_rows_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ImportRow>, RowLoadError> {
    let file = std::fs::File::open(path)?;
    read_rows(file)
}
