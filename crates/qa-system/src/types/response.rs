//! Response types for QA queries

use serde::{Deserialize, Serialize};

use super::answer::Answer;
use super::document::Document;

/// Response from a pipeline query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The question as asked
    pub question: String,
    /// Ranked answers
    pub answers: Vec<Answer>,
    /// Number of documents the reader saw
    pub documents_retrieved: usize,
    /// Retrieved documents (when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    /// Wall-clock processing time
    pub processing_time_ms: u64,
}

/// Response from the Wikipedia demo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiQueryResponse {
    pub question: String,
    pub answers: Vec<Answer>,
    /// Model id that produced the answers
    pub model: String,
    /// Page the answer was read from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    pub processing_time_ms: u64,
}

/// Index load summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records accepted by the index
    pub indexed: usize,
    /// Records rejected (logged, not fatal)
    pub failed: usize,
    /// Documents in the index after refresh
    pub total_in_index: u64,
}
