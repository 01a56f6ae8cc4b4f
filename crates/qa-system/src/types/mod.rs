//! Core types for the QA system

pub mod answer;
pub mod document;
pub mod example;
pub mod query;
pub mod response;

pub use answer::{Answer, AnswerSpan, ReaderOutput};
pub use document::{CorpusRecord, Document, SearchHit, SearchResponse};
pub use example::EvalExample;
pub use query::{QueryRequest, WikiQueryRequest};
pub use response::{LoadReport, QueryResponse, WikiQueryResponse};
