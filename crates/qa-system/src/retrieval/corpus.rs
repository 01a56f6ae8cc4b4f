//! Evidence corpus files

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::CorpusRecord;

/// Load a corpus file: a JSON array of records, or one record per line
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<CorpusRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }

    let raw = std::fs::read_to_string(path)?;
    let records = parse_corpus(&raw)?;
    tracing::info!("Loaded {} corpus records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse corpus text in either format
pub fn parse_corpus(raw: &str) -> Result<Vec<CorpusRecord>> {
    let trimmed = raw.trim_start();

    let records: Vec<CorpusRecord> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()?
    };

    Ok(records.into_iter().map(CorpusRecord::normalized).collect())
}
