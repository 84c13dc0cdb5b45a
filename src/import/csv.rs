use std::path::Path;

use csv::ReaderBuilder;
use tracing::warn;

use super::{ImportError, StatementImporter};
use crate::core::RawTransaction;

pub struct CsvImporter;

impl CsvImporter {
    /// Best-effort load: rows that fail to deserialize are skipped with a
    /// warning instead of aborting the whole file.
    fn parse_internal(path: &Path) -> Result<Vec<RawTransaction>, ImportError> {
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| ImportError::Parse(e.to_string()))?;
        let mut rows = Vec::new();
        for (i, result) in rdr.deserialize().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                // +2: one for the header line, one for zero-based indexing.
                Err(e) => warn!(line = i + 2, error = %e, "skipping malformed row"),
            }
        }
        Ok(rows)
    }
}

impl StatementImporter for CsvImporter {
    fn parse(path: &Path) -> Result<Vec<RawTransaction>, ImportError> {
        Self::parse_internal(path)
    }
}

pub fn parse(path: &Path) -> Result<Vec<RawTransaction>, ImportError> {
    CsvImporter::parse(path)
}
