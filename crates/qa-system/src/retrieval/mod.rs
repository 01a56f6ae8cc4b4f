//! Retrieval helpers shared by the search-backed retrievers

pub mod corpus;
pub mod query;

pub use corpus::{load_corpus, parse_corpus};
pub use query::{index_mapping, question_query, sanitize_question};
