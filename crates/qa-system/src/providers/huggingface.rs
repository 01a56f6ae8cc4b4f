//! Hugging Face question-answering inference client with retry logic

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::types::AnswerSpan;

use super::reader::ReaderProvider;

#[derive(Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
    parameters: QaParameters,
}

#[derive(Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Serialize)]
struct QaParameters {
    top_k: usize,
    handle_impossible_answer: bool,
}

/// The pipeline returns a bare object for `top_k == 1` and a list otherwise
#[derive(Deserialize)]
#[serde(untagged)]
enum QaResponse {
    Many(Vec<AnswerSpan>),
    One(AnswerSpan),
}

impl QaResponse {
    fn into_spans(self) -> Vec<AnswerSpan> {
        match self {
            QaResponse::Many(spans) => spans,
            QaResponse::One(span) => vec![span],
        }
    }
}

/// Question-answering client for the Hugging Face inference API
///
/// Also works against self-hosted endpoints exposing the same
/// `/models/{model}` route.
#[derive(Clone)]
pub struct HuggingFaceQa {
    client: Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
    max_retries: u32,
}

impl HuggingFaceQa {
    /// Create a new client for the configured default model
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_token: config.api_token.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Same connection settings, different model
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Inference request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::reader("Unknown error")))
    }
}

#[async_trait]
impl ReaderProvider for HuggingFaceQa {
    async fn answer_spans(
        &self,
        question: &str,
        context: &str,
        top_k: usize,
        handle_impossible_answer: bool,
    ) -> Result<Vec<AnswerSpan>> {
        let url = self.endpoint();

        self.retry_request(|| {
            let url = url.clone();
            let client = self.client.clone();
            let token = self.api_token.clone();

            async move {
                let request = QaRequest {
                    inputs: QaInputs { question, context },
                    parameters: QaParameters {
                        top_k: top_k.max(1),
                        handle_impossible_answer,
                    },
                };

                let mut builder = client.post(&url).json(&request);
                if let Some(token) = token {
                    builder = builder.bearer_auth(token);
                }

                let response = builder
                    .send()
                    .await
                    .map_err(|e| Error::reader(format!("Inference request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::reader(format!(
                        "Inference failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let parsed: QaResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::reader(format!("Failed to parse inference response: {}", e)))?;

                Ok(parsed.into_spans())
            }
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        let mut builder = self.client.get(self.endpoint());
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        match builder.send().await {
            Ok(response) => Ok(!response.status().is_server_error()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "huggingface"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
