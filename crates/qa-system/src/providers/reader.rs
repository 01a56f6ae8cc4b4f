//! Reader provider trait for extractive question answering

use async_trait::async_trait;
use crate::error::Result;
use crate::types::AnswerSpan;

/// Trait for reading-comprehension inference over one passage
///
/// Implementations:
/// - `HuggingFaceQa`: Hugging Face question-answering inference endpoint
#[async_trait]
pub trait ReaderProvider: Send + Sync {
    /// Candidate spans for `question` in `context`, best first
    ///
    /// With `handle_impossible_answer` the model may return the null answer
    /// (empty text) as one of the candidates.
    async fn answer_spans(
        &self,
        question: &str,
        context: &str,
        top_k: usize,
        handle_impossible_answer: bool,
    ) -> Result<Vec<AnswerSpan>>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
