//! Index management endpoints

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{CorpusRecord, LoadReport};

fn no_index() -> Error {
    Error::Config("no search index configured".to_string())
}

/// POST /api/documents - Load corpus records into the index
pub async fn load_documents(
    State(state): State<AppState>,
    Json(records): Json<Vec<CorpusRecord>>,
) -> Result<Json<LoadReport>> {
    let index = state.index().ok_or_else(no_index)?;

    if records.is_empty() {
        return Err(Error::invalid_request("no records supplied"));
    }

    let records: Vec<CorpusRecord> = records.into_iter().map(CorpusRecord::normalized).collect();

    index.create_index().await?;
    let report = index.load_index(&records, |_| {}).await?;

    Ok(Json(report))
}

/// GET /api/documents/count - Number of indexed documents
pub async fn count_documents(State(state): State<AppState>) -> Result<Json<Value>> {
    let index = state.index().ok_or_else(no_index)?;
    let count = index.count().await?;

    Ok(Json(json!({
        "index": index.index_name(),
        "count": count,
    })))
}
