//! qa-system: open-domain question answering over a search index
//!
//! A retriever issues one full-text query per question against Elasticsearch,
//! a reader runs an extractive question-answering model over each hit, and the
//! per-document answers are merged into one ranked list under a null-answer
//! policy. Also ships a batch evaluation loop, an HTTP server and a Wikipedia
//! demo.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod pipeline;
pub mod providers;
pub mod reading;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::QaConfig;
pub use error::{Error, Result};
pub use pipeline::{QaSystem, QueryResult};
pub use reading::{MergeStrategy, Reader, ReaderOptions};
pub use types::{
    answer::{Answer, AnswerSpan, ReaderOutput},
    document::{CorpusRecord, Document},
    example::EvalExample,
};
