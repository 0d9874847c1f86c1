//! HTTP client for the analysis service.
//!
//! This module performs the two network operations the workflow depends
//! on (question generation and answer submission) and normalizes every
//! outcome into the [`AnalysisError`] taxonomy.

use crate::models::{
    AnalysisRequest, AnalysisResult, AnswerReceipt, AnswerSubmission, ErrorBody,
};
use crate::workflow::AnalysisBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Failure taxonomy for the analysis workflow.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input rejected locally before any network attempt.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response from the service; the message is taken verbatim
    /// from the error payload when present.
    #[error("{}", .message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Service {
        status: u16,
        message: Option<String>,
    },

    /// The service could not be reached or its response could not be
    /// parsed.
    #[error("{0}")]
    Transport(String),
}

/// Fallback shown when a failure carries no message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Configuration for the analysis client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the analysis service, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

/// Client for the analysis service API.
pub struct AnalysisClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl AnalysisClient {
    /// Create a new client against the configured service.
    pub fn new(config: ClientConfig) -> Self {
        info!("Analysis service at: {}", config.base_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Build a full endpoint URL from the configured base.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Submit a URL for analysis and return the generated result.
    ///
    /// One request, no retries; a malformed success payload is reported
    /// as a transport failure rather than handed downstream.
    pub async fn submit_url_for_analysis(
        &self,
        url: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let endpoint = self.endpoint("generate-questions");
        debug!("POST {} for {}", endpoint, url);

        let request = AnalysisRequest {
            url: url.to_string(),
        };

        let response = self
            .http_client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.service_error(response).await);
        }

        response.json::<AnalysisResult>().await.map_err(|e| {
            AnalysisError::Transport(format!("Failed to parse analysis response: {}", e))
        })
    }

    /// Forward a chosen answer to the service.
    pub async fn submit_answer(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<AnswerReceipt, AnalysisError> {
        let endpoint = self.endpoint("analyze-results");
        debug!("POST {} for {}", endpoint, submission.url);

        let response = self
            .http_client
            .post(&endpoint)
            .json(submission)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.service_error(response).await);
        }

        response.json::<AnswerReceipt>().await.map_err(|e| {
            AnalysisError::Transport(format!("Failed to parse answer receipt: {}", e))
        })
    }

    /// Map a reqwest failure to a transport error with an operator-facing
    /// message.
    fn transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Transport(format!(
                "Request timed out after {}s",
                self.config.timeout_seconds
            ))
        } else if e.is_connect() {
            AnalysisError::Transport(format!(
                "Cannot connect to the analysis service at {}. Is it running?",
                self.config.base_url
            ))
        } else {
            AnalysisError::Transport(format!("Failed to send request: {}", e))
        }
    }

    /// Read a non-2xx response into a service error, keeping the
    /// service's message when its error payload has one.
    async fn service_error(&self, response: reqwest::Response) -> AnalysisError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);

        AnalysisError::Service { status, message }
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn analyze(&self, url: &str) -> Result<AnalysisResult, AnalysisError> {
        self.submit_url_for_analysis(url).await
    }

    async fn submit_answer(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<AnswerReceipt, AnalysisError> {
        AnalysisClient::submit_answer(self, submission).await
    }
}
