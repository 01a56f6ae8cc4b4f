//! Provider abstractions for retrieval and reading
//!
//! Trait-based seams so the pipeline can run against Elasticsearch or
//! Wikipedia for retrieval, and any question-answering inference endpoint
//! for reading.

pub mod elasticsearch;
pub mod huggingface;
pub mod reader;
pub mod retriever;
pub mod wikipedia;

pub use elasticsearch::ElasticsearchRetriever;
pub use huggingface::HuggingFaceQa;
pub use reader::ReaderProvider;
pub use retriever::RetrieverProvider;
pub use wikipedia::{WikipediaClient, WikipediaRetriever};
