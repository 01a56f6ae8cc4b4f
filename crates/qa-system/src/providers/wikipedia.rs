//! Wikipedia search for the interactive demo
//!
//! Uses the public MediaWiki action API: `list=search` to find pages and
//! `prop=extracts|info` for plain-text content and canonical URLs.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::WikipediaConfig;
use crate::error::{Error, Result};
use crate::types::Document;

use super::retriever::RetrieverProvider;

#[derive(Deserialize)]
struct SearchEnvelope {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Deserialize)]
struct PageEnvelope {
    query: PageQuery,
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<PageEntry>,
}

#[derive(Deserialize)]
struct PageEntry {
    #[serde(default)]
    pageid: Option<u64>,
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    fullurl: String,
    #[serde(default)]
    missing: bool,
}

/// A fetched Wikipedia page
#[derive(Debug, Clone)]
pub struct WikiPage {
    pub page_id: u64,
    pub title: String,
    pub url: String,
    pub content: String,
}

impl From<WikiPage> for Document {
    fn from(page: WikiPage) -> Self {
        Document {
            id: page.page_id.to_string(),
            score: 0.0,
            text: page.content,
            title: page.title,
            url: page.url,
        }
    }
}

/// MediaWiki API client
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    config: WikipediaConfig,
}

impl WikipediaClient {
    /// Create a new client
    pub fn new(config: &WikipediaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Page titles matching the query, best first
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.config.search_limit.to_string();
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| Error::retriever(format!("Wikipedia search failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::retriever(format!(
                "Wikipedia search failed: HTTP {}",
                response.status()
            )));
        }

        let envelope: SearchEnvelope = response
            .json()
            .await
            .map_err(|e| Error::retriever(format!("Failed to parse Wikipedia search: {}", e)))?;

        Ok(envelope.query.search.into_iter().map(|s| s.title).collect())
    }

    /// Plain-text content of a page, following redirects
    pub async fn page(&self, title: &str) -> Result<WikiPage> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts|info"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await
            .map_err(|e| Error::retriever(format!("Wikipedia page request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::retriever(format!(
                "Wikipedia page request failed: HTTP {}",
                response.status()
            )));
        }

        let envelope: PageEnvelope = response
            .json()
            .await
            .map_err(|e| Error::retriever(format!("Failed to parse Wikipedia page: {}", e)))?;

        let page = envelope
            .query
            .pages
            .into_iter()
            .find(|p| !p.missing)
            .ok_or_else(|| Error::NotFound(format!("Wikipedia page {:?}", title)))?;

        Ok(WikiPage {
            page_id: page.pageid.unwrap_or_default(),
            title: page.title,
            url: page.fullurl,
            content: page.extract,
        })
    }
}

/// Retriever returning whole Wikipedia pages for the top search results
pub struct WikipediaRetriever {
    client: WikipediaClient,
}

impl WikipediaRetriever {
    pub fn new(client: WikipediaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RetrieverProvider for WikipediaRetriever {
    async fn retrieve(&self, question: &str, n_results: usize) -> Result<Vec<Document>> {
        let titles = self.client.search(question).await?;
        if let Some(top) = titles.first() {
            tracing::info!("Top Wikipedia result: {}", top);
        }

        let mut documents = Vec::new();
        for title in titles.iter().take(n_results) {
            match self.client.page(title).await {
                Ok(page) if !page.content.trim().is_empty() => documents.push(page.into()),
                Ok(_) => tracing::debug!("Skipping empty page {}", title),
                Err(Error::NotFound(_)) => tracing::debug!("Page {} disappeared", title),
                Err(e) => return Err(e),
            }
        }

        Ok(documents)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.client.get(&self.client.config.api_url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "wikipedia"
    }
}
