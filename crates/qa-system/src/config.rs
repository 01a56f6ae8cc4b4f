//! Configuration for the QA system

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::reading::MergeStrategy;

/// Main QA system configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QaConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Search service (retriever) configuration
    pub elasticsearch: ElasticsearchConfig,
    /// Inference service (reader) configuration
    pub reader: ReaderConfig,
    /// Wikipedia demo configuration
    pub wikipedia: WikipediaConfig,
    /// Retriever/reader composition
    pub pipeline: PipelineConfig,
    /// Batch evaluation output
    pub evaluation: EvaluationConfig,
}

impl QaConfig {
    /// Load configuration from a TOML file
    ///
    /// Sections and fields missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                crate::error::Error::NotFound(path.display().to_string())
            } else {
                e.into()
            }
        })?;
        let config: QaConfig = toml::from_str(&raw)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply `QA_*` / `HF_API_TOKEN` environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("QA_ES_URL") {
            self.elasticsearch.url = url;
        }
        if let Ok(index) = std::env::var("QA_ES_INDEX") {
            self.elasticsearch.index_name = index;
        }
        if let Ok(url) = std::env::var("QA_READER_URL") {
            self.reader.base_url = url;
        }
        if let Ok(model) = std::env::var("QA_READER_MODEL") {
            self.reader.model = model;
        }
        if let Ok(token) = std::env::var("HF_API_TOKEN") {
            if !token.is_empty() {
                self.reader.api_token = Some(token);
            }
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Elasticsearch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    /// Cluster base URL
    pub url: String,
    /// Index holding the evidence corpus
    pub index_name: String,
    /// Field the question is matched against
    pub default_field: String,
    /// Optional basic-auth user
    pub username: Option<String>,
    /// Optional basic-auth password
    pub password: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index_name: "demo_index".to_string(),
            default_field: "document_text_clean".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

/// Reader (question-answering inference) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Inference API base URL
    pub base_url: String,
    /// Default model id
    pub model: String,
    /// Named model presets selectable by the demo (display name -> model id)
    pub models: BTreeMap<String, String>,
    /// Bearer token for the inference API
    pub api_token: Option<String>,
    /// Answers kept after merging
    pub top_k: usize,
    /// Candidate spans requested per document
    pub top_n_per_doc: usize,
    /// Let the model return the null answer
    pub handle_impossible_answer: bool,
    /// Append null answers after the ranked non-null ones
    pub include_null_answers: bool,
    /// How per-document candidates are merged
    pub merge_strategy: MergeStrategy,
    /// Concurrent inference requests per question
    pub max_concurrent_requests: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            "distilbert_base_uncased_squad2".to_string(),
            "twmkn9/distilbert-base-uncased-squad2".to_string(),
        );
        models.insert(
            "bert_base_cased_squad2".to_string(),
            "deepset/bert-base-cased-squad2".to_string(),
        );
        models.insert(
            "bert_large_uncased_squad1".to_string(),
            "bert-large-uncased-whole-word-masking-finetuned-squad".to_string(),
        );

        Self {
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: "twmkn9/distilbert-base-uncased-squad2".to_string(),
            models,
            api_token: None,
            top_k: 3,
            top_n_per_doc: 3,
            handle_impossible_answer: true,
            include_null_answers: true,
            merge_strategy: MergeStrategy::BestPerDocument,
            max_concurrent_requests: 4,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl ReaderConfig {
    /// Resolve a preset name to a model id
    pub fn resolve_model(&self, name: &str) -> Option<&str> {
        self.models.get(name).map(String::as_str)
    }
}

/// Wikipedia demo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaConfig {
    /// MediaWiki API endpoint
    pub api_url: String,
    /// Search results requested per question
    pub search_limit: usize,
    /// User-Agent sent to the API
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            search_limit: 10,
            user_agent: format!("qa-system/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

/// Retriever/reader composition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Documents retrieved per question
    pub n_docs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { n_docs: 5 }
    }
}

/// Evaluation output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Directory for prediction files
    pub output_dir: PathBuf,
    /// Prediction file name; meta predictions go to `<stem>_meta.json`
    pub filename: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        let output_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("qa-system")
            .join("predictions");

        Self {
            output_dir,
            filename: "qasystem_predictions.json".to_string(),
        }
    }
}
