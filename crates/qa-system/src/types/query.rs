//! Query request types

use serde::{Deserialize, Serialize};

/// Question submitted to the QA pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Answers to return (default: reader config)
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Documents to retrieve (default: pipeline config)
    #[serde(default)]
    pub n_docs: Option<usize>,

    /// Include retrieved documents in the response (default: false)
    #[serde(default)]
    pub include_documents: bool,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            n_docs: None,
            include_documents: false,
        }
    }

    /// Set the number of answers to keep
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Set the number of documents to retrieve
    pub fn with_n_docs(mut self, n: usize) -> Self {
        self.n_docs = Some(n);
        self
    }

    /// Include retrieved documents in the response
    pub fn with_documents(mut self) -> Self {
        self.include_documents = true;
        self
    }
}

/// Question for the Wikipedia demo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiQueryRequest {
    /// The question to answer
    pub question: String,

    /// Model preset name (default model when absent or unknown)
    #[serde(default)]
    pub model: Option<String>,

    /// Answers to return
    #[serde(default)]
    pub top_k: Option<usize>,
}
