//! Elasticsearch-backed retriever
//!
//! Talks to the cluster over its REST API: index creation, record loading,
//! and one `query_string` search per question.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::ElasticsearchConfig;
use crate::error::{Error, Result};
use crate::retrieval::{index_mapping, question_query, sanitize_question};
use crate::types::{CorpusRecord, Document, LoadReport, SearchResponse};

use super::retriever::RetrieverProvider;

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Retriever over one Elasticsearch index
pub struct ElasticsearchRetriever {
    client: Client,
    config: ElasticsearchConfig,
}

impl ElasticsearchRetriever {
    /// Create a retriever without contacting the cluster
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Create a retriever and verify the cluster answers
    pub async fn connect(config: &ElasticsearchConfig) -> Result<Self> {
        let retriever = Self::new(config)?;
        if !retriever.health_check().await? {
            return Err(Error::retriever(format!(
                "Couldn't connect to Elasticsearch at {}",
                config.url
            )));
        }
        tracing::info!("Connected to Elasticsearch at {}", config.url);
        Ok(retriever)
    }

    /// Name of the index this retriever reads
    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_ref()),
            None => request,
        }
    }

    /// Create the index with the corpus mapping
    ///
    /// Returns `false` when the index already exists.
    pub async fn create_index(&self) -> Result<bool> {
        let response = self
            .authed(self.client.put(self.url(&self.config.index_name)))
            .json(&index_mapping())
            .send()
            .await
            .map_err(|e| Error::retriever(format!("Index creation request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Index {} created successfully", self.config.index_name);
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && body.contains("resource_already_exists_exception")
        {
            tracing::info!("Index {} already exists", self.config.index_name);
            return Ok(false);
        }

        Err(Error::retriever(format!(
            "Index creation failed: HTTP {} - {}",
            status, body
        )))
    }

    /// Index a single record under `id`
    pub async fn index_record(&self, id: usize, record: &CorpusRecord) -> Result<()> {
        let path = format!("{}/_doc/{}", self.config.index_name, id);
        let response = self
            .authed(self.client.put(self.url(&path)))
            .json(record)
            .send()
            .await
            .map_err(|e| Error::retriever(format!("Index request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::retriever(format!(
                "Indexing failed: HTTP {} - {}",
                status, body
            )));
        }

        Ok(())
    }

    /// Load records into the index, ids are record positions
    ///
    /// Per-record failures are logged and counted. `on_progress` is called
    /// after every record with the number processed so far.
    pub async fn load_index<F>(&self, records: &[CorpusRecord], mut on_progress: F) -> Result<LoadReport>
    where
        F: FnMut(usize),
    {
        let mut report = LoadReport::default();

        for (i, record) in records.iter().enumerate() {
            match self.index_record(i, record).await {
                Ok(()) => report.indexed += 1,
                Err(e) => {
                    tracing::error!("Error loading doc with index {}: {}", i, e);
                    report.failed += 1;
                }
            }
            on_progress(i + 1);
        }

        self.refresh().await?;
        report.total_in_index = self.count().await?;

        tracing::info!(
            "Successfully loaded {} records into {} ({} failed, {} total)",
            report.indexed,
            self.config.index_name,
            report.failed,
            report.total_in_index
        );

        Ok(report)
    }

    /// Make freshly indexed records searchable
    pub async fn refresh(&self) -> Result<()> {
        let path = format!("{}/_refresh", self.config.index_name);
        let response = self
            .authed(self.client.post(self.url(&path)))
            .send()
            .await
            .map_err(|e| Error::retriever(format!("Refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::retriever(format!(
                "Refresh failed: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Number of documents in the index
    pub async fn count(&self) -> Result<u64> {
        let path = format!("{}/_count", self.config.index_name);
        let response = self
            .authed(self.client.get(self.url(&path)))
            .send()
            .await
            .map_err(|e| Error::retriever(format!("Count request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("index {}", self.config.index_name)));
        }
        if !response.status().is_success() {
            return Err(Error::retriever(format!(
                "Count failed: HTTP {}",
                response.status()
            )));
        }

        let count: CountResponse = response
            .json()
            .await
            .map_err(|e| Error::retriever(format!("Failed to parse count response: {}", e)))?;
        Ok(count.count)
    }

    /// Run one full-text query for a question and return the raw hits
    pub async fn run_question_query(&self, question: &str, n_results: usize) -> Result<SearchResponse> {
        let sanitized = sanitize_question(question);
        if sanitized.trim().is_empty() {
            tracing::debug!("Question {:?} has no searchable terms", question);
            return Ok(SearchResponse::default());
        }

        let body = question_query(&sanitized, &self.config.default_field, n_results);
        let path = format!("{}/_search", self.config.index_name);

        let response = self
            .authed(self.client.post(self.url(&path)))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::retriever(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("index {}", self.config.index_name)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::retriever(format!(
                "Search failed: HTTP {} - {}",
                status, body
            )));
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::retriever(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!(
            "Search for {:?} returned {} hits in {}ms",
            sanitized.trim(),
            results.len(),
            results.took
        );

        Ok(results)
    }
}

#[async_trait]
impl RetrieverProvider for ElasticsearchRetriever {
    async fn retrieve(&self, question: &str, n_results: usize) -> Result<Vec<Document>> {
        let results = self.run_question_query(question, n_results).await?;
        Ok(results.documents())
    }

    async fn health_check(&self) -> Result<bool> {
        match self.authed(self.client.get(self.url(""))).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}
