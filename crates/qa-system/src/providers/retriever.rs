//! Retriever provider trait for fetching candidate passages

use async_trait::async_trait;
use crate::error::Result;
use crate::types::Document;

/// Trait for passage retrieval
///
/// Implementations:
/// - `ElasticsearchRetriever`: full-text query against an Elasticsearch index
/// - `WikipediaRetriever`: top Wikipedia page for the question (demo)
#[async_trait]
pub trait RetrieverProvider: Send + Sync {
    /// Retrieve up to `n_results` documents for a question, best first
    async fn retrieve(&self, question: &str, n_results: usize) -> Result<Vec<Document>>;

    /// Check if the backing service is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
