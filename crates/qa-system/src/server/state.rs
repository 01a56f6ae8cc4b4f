//! Application state for the QA server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::QaConfig;
use crate::error::Result;
use crate::pipeline::QaSystem;
use crate::providers::{
    ElasticsearchRetriever, HuggingFaceQa, RetrieverProvider, WikipediaClient,
    WikipediaRetriever,
};
use crate::reading::{Reader, ReaderOptions};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: QaConfig,
    /// Retriever + reader pipeline
    qa: QaSystem,
    /// Index handle for loading and counting (None when not search-backed)
    index: Option<Arc<ElasticsearchRetriever>>,
    /// Retriever for the Wikipedia demo
    wiki: Arc<dyn RetrieverProvider>,
    /// Inference client used to build readers for named model presets
    reader_client: Option<HuggingFaceQa>,
    /// Ready state
    ready: RwLock<bool>,
}

/// Optional parts of the state
#[derive(Default)]
pub struct StateParts {
    pub index: Option<Arc<ElasticsearchRetriever>>,
    pub reader_client: Option<HuggingFaceQa>,
}

impl AppState {
    /// Create application state from configuration
    pub async fn new(config: QaConfig) -> Result<Self> {
        tracing::info!("Initializing QA application state...");

        let index = Arc::new(ElasticsearchRetriever::new(&config.elasticsearch)?);
        if index.health_check().await? {
            tracing::info!("Elasticsearch reachable at {}", config.elasticsearch.url);
        } else {
            tracing::warn!(
                "Elasticsearch not available at {}; /api/query will fail until it is",
                config.elasticsearch.url
            );
        }

        let reader_client = HuggingFaceQa::new(&config.reader)?;
        tracing::info!(
            "Reader initialized (model: {}, endpoint: {})",
            config.reader.model,
            config.reader.base_url
        );

        let reader = Reader::new(
            Arc::new(reader_client.clone()),
            ReaderOptions::from(&config.reader),
        );
        let qa = QaSystem::new(index.clone(), reader, config.pipeline.clone());

        let wiki = Arc::new(WikipediaRetriever::new(WikipediaClient::new(&config.wikipedia)?));

        let state = Self::from_parts(
            config,
            qa,
            wiki,
            StateParts {
                index: Some(index),
                reader_client: Some(reader_client),
            },
        );
        state.set_ready(true);
        Ok(state)
    }

    /// Assemble state from prebuilt components
    pub fn from_parts(
        config: QaConfig,
        qa: QaSystem,
        wiki: Arc<dyn RetrieverProvider>,
        parts: StateParts,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                qa,
                index: parts.index,
                wiki,
                reader_client: parts.reader_client,
                ready: RwLock::new(false),
            }),
        }
    }

    pub fn config(&self) -> &QaConfig {
        &self.inner.config
    }

    pub fn qa(&self) -> &QaSystem {
        &self.inner.qa
    }

    pub fn index(&self) -> Option<&Arc<ElasticsearchRetriever>> {
        self.inner.index.as_ref()
    }

    pub fn wiki(&self) -> &Arc<dyn RetrieverProvider> {
        &self.inner.wiki
    }

    /// Reader for a model preset; unknown or absent names use the default reader
    pub fn reader_for(&self, preset: Option<&str>) -> Reader {
        let default = self.inner.qa.reader().clone();

        let Some(name) = preset else {
            return default;
        };

        match (self.inner.config.reader.resolve_model(name), &self.inner.reader_client) {
            (Some(model), Some(client)) => Reader::new(
                Arc::new(client.with_model(model)),
                default.options().clone(),
            ),
            (Some(_), None) => default,
            (None, _) => {
                tracing::warn!("Unknown model preset {:?}, using {}", name, default.model());
                default
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
