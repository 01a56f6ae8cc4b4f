//! Query endpoints: indexed corpus and Wikipedia demo

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse, WikiQueryRequest, WikiQueryResponse};

/// POST /api/query - Answer a question from the indexed corpus
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    if request.question.trim().is_empty() {
        return Err(Error::invalid_request("question must not be empty"));
    }

    tracing::info!("Query: \"{}\"", request.question);

    let result = state
        .qa()
        .query_with(&request.question, request.n_docs, request.top_k)
        .await?;

    let documents_retrieved = result.documents.len();
    let documents = request.include_documents.then_some(result.documents);

    Ok(Json(QueryResponse {
        question: result.output.question,
        answers: result.output.answers,
        documents_retrieved,
        documents,
        processing_time_ms: result.processing_time_ms,
    }))
}

/// POST /api/wiki - Answer a question from the top Wikipedia page
pub async fn wiki_query(
    State(state): State<AppState>,
    Json(request): Json<WikiQueryRequest>,
) -> Result<Json<WikiQueryResponse>> {
    let start = Instant::now();

    if request.question.trim().is_empty() {
        return Err(Error::invalid_request("question must not be empty"));
    }

    tracing::info!("Wikipedia query: \"{}\"", request.question);

    let documents = state.wiki().retrieve(&request.question, 1).await?;
    let reader = state.reader_for(request.model.as_deref());
    let output = reader
        .predict(&request.question, &documents, request.top_k)
        .await?;

    let page = documents.first();

    Ok(Json(WikiQueryResponse {
        question: output.question,
        answers: output.answers,
        model: reader.model().to_string(),
        page_title: page.map(|d| d.title.clone()),
        page_url: page.map(|d| d.url.clone()).filter(|u| !u.is_empty()),
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
