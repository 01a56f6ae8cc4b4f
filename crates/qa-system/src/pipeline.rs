//! QaSystem: retriever and reader composed into one question-answering pipeline

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::evaluation::{EvalReport, Evaluation, PredictionScorer};
use crate::providers::RetrieverProvider;
use crate::reading::Reader;
use crate::types::{Document, EvalExample, ReaderOutput};

/// Answers plus the documents they were read from
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub output: ReaderOutput,
    pub documents: Vec<Document>,
    pub processing_time_ms: u64,
}

/// End-to-end question answering over a retriever and a reader
#[derive(Clone)]
pub struct QaSystem {
    retriever: Arc<dyn RetrieverProvider>,
    reader: Reader,
    config: PipelineConfig,
}

impl QaSystem {
    pub fn new(retriever: Arc<dyn RetrieverProvider>, reader: Reader, config: PipelineConfig) -> Self {
        Self {
            retriever,
            reader,
            config,
        }
    }

    pub fn retriever(&self) -> &Arc<dyn RetrieverProvider> {
        &self.retriever
    }

    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    /// Answer a question with the configured document and answer counts
    pub async fn query(&self, question: &str) -> Result<QueryResult> {
        self.query_with(question, None, None).await
    }

    /// Answer a question with per-call overrides
    pub async fn query_with(
        &self,
        question: &str,
        n_docs: Option<usize>,
        top_k: Option<usize>,
    ) -> Result<QueryResult> {
        let start = Instant::now();
        let n_docs = n_docs.unwrap_or(self.config.n_docs).max(1);

        let documents = self.retriever.retrieve(question, n_docs).await?;
        tracing::debug!(
            "{} returned {} documents for {:?}",
            self.retriever.name(),
            documents.len(),
            question
        );

        let output = self.reader.predict(question, &documents, top_k).await?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Answered {:?} in {}ms ({} documents, {} answers)",
            question,
            processing_time_ms,
            documents.len(),
            output.answers.len()
        );

        Ok(QueryResult {
            output,
            documents,
            processing_time_ms,
        })
    }

    /// Evaluate the whole pipeline over labeled examples
    ///
    /// Predictions are written to `output_dir/filename`; an existing file is
    /// reused instead of re-querying.
    pub async fn evaluate(
        &self,
        examples: &[EvalExample],
        output_dir: impl AsRef<Path>,
        filename: &str,
        scorer: &dyn PredictionScorer,
    ) -> Result<EvalReport> {
        Evaluation::new(output_dir, filename)
            .run(self, examples, scorer, |_| {})
            .await
    }
}
