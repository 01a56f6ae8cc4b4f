//! Reader: runs the question-answering model over retrieved documents and
//! merges the per-document results into one ranked answer list.

pub mod merge;

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::config::ReaderConfig;
use crate::error::Result;
use crate::providers::ReaderProvider;
use crate::types::{AnswerSpan, Document, ReaderOutput};

pub use merge::{merge, DocumentCandidates, MergeOptions, MergeStrategy};

/// Reader options, fixed at construction
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub top_k: usize,
    pub top_n_per_doc: usize,
    pub handle_impossible_answer: bool,
    pub include_null_answers: bool,
    pub merge_strategy: MergeStrategy,
    pub max_concurrent_requests: usize,
}

impl From<&ReaderConfig> for ReaderOptions {
    fn from(config: &ReaderConfig) -> Self {
        Self {
            top_k: config.top_k,
            top_n_per_doc: config.top_n_per_doc,
            handle_impossible_answer: config.handle_impossible_answer,
            include_null_answers: config.include_null_answers,
            merge_strategy: config.merge_strategy,
            max_concurrent_requests: config.max_concurrent_requests,
        }
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::from(&ReaderConfig::default())
    }
}

/// Question answering over a collection of documents
#[derive(Clone)]
pub struct Reader {
    provider: Arc<dyn ReaderProvider>,
    options: ReaderOptions,
}

impl Reader {
    pub fn new(provider: Arc<dyn ReaderProvider>, options: ReaderOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Model id of the underlying provider
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Answer `question` from `documents`
    ///
    /// `top_k` overrides the configured answer count for this call only.
    /// One inference call is made per document; results are merged in
    /// document order.
    pub async fn predict(
        &self,
        question: &str,
        documents: &[Document],
        top_k: Option<usize>,
    ) -> Result<ReaderOutput> {
        if documents.is_empty() {
            return Ok(ReaderOutput::empty(question));
        }

        let top_k = top_k.unwrap_or(self.options.top_k).max(1);
        let spans = self.read_documents(question, documents).await?;

        let candidates: Vec<DocumentCandidates<'_>> = documents
            .iter()
            .zip(spans)
            .map(|(document, spans)| DocumentCandidates { document, spans })
            .collect();

        let answers = merge(
            self.options.merge_strategy,
            &candidates,
            MergeOptions {
                top_k,
                top_n_per_doc: self.options.top_n_per_doc,
                include_null_answers: self.options.include_null_answers,
            },
        );

        tracing::debug!(
            "Read {} documents with {}, kept {} answers",
            documents.len(),
            self.provider.model(),
            answers.len()
        );

        Ok(ReaderOutput {
            question: question.to_string(),
            answers,
        })
    }

    /// Candidate spans for every document, in document order
    async fn read_documents(
        &self,
        question: &str,
        documents: &[Document],
    ) -> Result<Vec<Vec<AnswerSpan>>> {
        let reads: Vec<_> = documents
            .iter()
            .map(|document| self.read_document(question, document))
            .collect();

        stream::iter(reads)
            .buffered(self.options.max_concurrent_requests.max(1))
            .try_collect()
            .await
    }

    /// Candidate spans for one document; blank documents are not sent
    async fn read_document(&self, question: &str, document: &Document) -> Result<Vec<AnswerSpan>> {
        if document.text.trim().is_empty() {
            tracing::debug!("Skipping document {} with no text", document.id);
            return Ok(Vec::new());
        }

        self.provider
            .answer_spans(
                question,
                &document.text,
                self.options.top_n_per_doc.max(1),
                self.options.handle_impossible_answer,
            )
            .await
    }
}
