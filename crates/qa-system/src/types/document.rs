//! Corpus records, raw search hits and reader documents

use serde::{Deserialize, Serialize};

/// One evidence record stored in the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    /// Page or passage title
    #[serde(default)]
    pub document_title: String,
    /// Source URL
    #[serde(default)]
    pub document_url: String,
    /// Full passage text handed to the reader
    #[serde(default)]
    pub document_text: String,
    /// Normalized text the question is matched against
    #[serde(default)]
    pub document_text_clean: String,
}

impl CorpusRecord {
    /// Create a record, deriving the clean text from the full text
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            document_title: title.into(),
            document_url: url.into(),
            document_text_clean: text.clone(),
            document_text: text,
        }
    }

    /// Fill whichever text field is missing from the other
    pub fn normalized(mut self) -> Self {
        if self.document_text_clean.trim().is_empty() {
            self.document_text_clean = self.document_text.clone();
        }
        if self.document_text.trim().is_empty() {
            self.document_text = self.document_text_clean.clone();
        }
        self
    }
}

/// Raw search response, as returned by the search service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Server-side query time in milliseconds
    #[serde(default)]
    pub took: u64,
    /// Hit envelope
    #[serde(default)]
    pub hits: SearchHits,
}

/// Hit envelope of a search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHits {
    /// Total matching documents
    #[serde(default)]
    pub total: Option<HitsTotal>,
    /// Best hits in rank order
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Total hit count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitsTotal {
    pub value: u64,
    #[serde(default)]
    pub relation: Option<String>,
}

/// A single raw search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f32>,
    #[serde(rename = "_source")]
    pub source: CorpusRecord,
}

/// Document handed to the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Search-index document id
    pub id: String,
    /// Retrieval score
    pub score: f32,
    /// Passage text
    pub text: String,
    /// Passage title
    pub title: String,
    /// Source URL (may be empty)
    #[serde(default)]
    pub url: String,
}

impl Document {
    /// Create a document directly (used by non-index retrievers)
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            score: 0.0,
            text: text.into(),
            title: title.into(),
            url: String::new(),
        }
    }

    /// Reshape a raw hit; full text is preferred over the clean text
    pub fn from_hit(hit: &SearchHit) -> Self {
        let text = if hit.source.document_text.trim().is_empty() {
            hit.source.document_text_clean.clone()
        } else {
            hit.source.document_text.clone()
        };

        Self {
            id: hit.id.clone(),
            score: hit.score.unwrap_or(0.0),
            text,
            title: hit.source.document_title.clone(),
            url: hit.source.document_url.clone(),
        }
    }
}

impl SearchResponse {
    /// Reshape all hits, keeping rank order
    pub fn documents(&self) -> Vec<Document> {
        self.hits.hits.iter().map(Document::from_hit).collect()
    }

    /// Number of hits returned
    pub fn len(&self) -> usize {
        self.hits.hits.len()
    }

    /// True when no hits were returned
    pub fn is_empty(&self) -> bool {
        self.hits.hits.is_empty()
    }
}
