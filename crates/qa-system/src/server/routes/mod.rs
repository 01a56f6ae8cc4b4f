//! API routes for the QA server

pub mod documents;
pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Question answering
        .route("/query", post(query::query))
        .route("/wiki", post(query::wiki_query))
        // Index management
        .route("/documents", post(documents::load_documents))
        .route("/documents/count", get(documents::count_documents))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();

    Json(serde_json::json!({
        "name": "qa-system",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over a search index with an extractive reader",
        "endpoints": {
            "POST /api/query": "Answer a question from the indexed corpus",
            "POST /api/wiki": "Answer a question from the top Wikipedia page",
            "POST /api/documents": "Load corpus records into the index",
            "GET /api/documents/count": "Number of indexed documents",
        },
        "retriever": state.qa().retriever().name(),
        "index": config.elasticsearch.index_name,
        "reader": {
            "model": state.qa().reader().model(),
            "merge_strategy": config.reader.merge_strategy,
            "top_k": config.reader.top_k,
        },
        "models": config.reader.models,
    }))
}
