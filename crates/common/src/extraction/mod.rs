//! Extraction service abstraction
//!
//! The extractor turns a set of URLs plus a natural-language instruction
//! (and optionally a JSON schema) into structured data. Firecrawl runs
//! extraction as a job: the submit call returns an id, and the job is
//! polled until it completes.

use crate::config::ExtractionConfig;
use crate::errors::{AppError, Result};
use crate::metrics::{ExternalCall, Service};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One extraction request
#[derive(Debug, Clone, Serialize)]
pub struct ExtractRequest {
    pub urls: Vec<String>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl ExtractRequest {
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            prompt: prompt.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Trait for structured extraction
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Run an extraction and return its `data` payload
    async fn extract(&self, request: &ExtractRequest) -> Result<Value>;
}

/// Firecrawl extraction client
pub struct FirecrawlExtractor {
    client: reqwest::Client,
    config: ExtractionConfig,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    data: Option<Value>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: String,
    data: Option<Value>,
    error: Option<String>,
}

impl FirecrawlExtractor {
    /// Create a new Firecrawl client
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential { name: "FIRECRAWL_API_KEY" })
    }

    async fn submit(&self, request: &ExtractRequest) -> Result<SubmitResponse> {
        let url = format!("{}/v1/extract", self.config.api_base.trim_end_matches('/'));

        let response = self.client
            .post(&url)
            .bearer_auth(self.api_key()?)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Extraction {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Extraction {
                message: format!("API error {}: {}", status, body),
            });
        }

        response.json().await.map_err(|e| AppError::MalformedResponse {
            service: "extraction",
            message: format!("Failed to parse submit response: {}", e),
        })
    }

    async fn poll(&self, job_id: &str) -> Result<Value> {
        let url = format!(
            "{}/v1/extract/{}",
            self.config.api_base.trim_end_matches('/'),
            job_id
        );
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for attempt in 1..=self.config.max_polls {
            tokio::time::sleep(interval).await;

            let response = self.client
                .get(&url)
                .bearer_auth(self.api_key()?)
                .send()
                .await
                .map_err(|e| AppError::Extraction {
                    message: format!("Status request failed: {}", e),
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::Extraction {
                    message: format!("API error {}: {}", status, body),
                });
            }

            let status: StatusResponse = response.json().await.map_err(|e| {
                AppError::MalformedResponse {
                    service: "extraction",
                    message: format!("Failed to parse status response: {}", e),
                }
            })?;

            match status.status.as_str() {
                "completed" => {
                    return status.data.ok_or_else(|| AppError::MalformedResponse {
                        service: "extraction",
                        message: "Completed job carried no data".to_string(),
                    });
                }
                "failed" | "cancelled" => {
                    return Err(AppError::Extraction {
                        message: status
                            .error
                            .unwrap_or_else(|| format!("Extraction job {}", status.status)),
                    });
                }
                _ if !status.success => {
                    return Err(AppError::Extraction {
                        message: status.error.unwrap_or_else(|| "Job status request rejected".to_string()),
                    });
                }
                other => {
                    tracing::debug!(job_id, attempt, status = other, "Extraction job pending");
                }
            }
        }

        Err(AppError::Extraction {
            message: format!(
                "Extraction job {} did not complete after {} polls",
                job_id, self.config.max_polls
            ),
        })
    }

    async fn run(&self, request: &ExtractRequest) -> Result<Value> {
        let submitted = self.submit(request).await?;

        if !submitted.success {
            return Err(AppError::Extraction {
                message: submitted
                    .error
                    .unwrap_or_else(|| "Extraction request rejected".to_string()),
            });
        }

        if let Some(data) = submitted.data {
            return Ok(data);
        }

        let job_id = submitted.id.ok_or_else(|| AppError::MalformedResponse {
            service: "extraction",
            message: "Response carried neither data nor a job id".to_string(),
        })?;

        self.poll(&job_id).await
    }
}

#[async_trait]
impl Extractor for FirecrawlExtractor {
    async fn extract(&self, request: &ExtractRequest) -> Result<Value> {
        let call = ExternalCall::start(Service::Extraction);
        let result = self.run(request).await;
        let latency_ms = call.finish(result.is_ok());

        match &result {
            Ok(_) => tracing::info!(urls = ?request.urls, latency_ms, "Extraction completed"),
            Err(e) => tracing::warn!(urls = ?request.urls, latency_ms, error = %e, "Extraction failed"),
        }

        result
    }
}
