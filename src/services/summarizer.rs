use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const PAYLOAD_FAILURE: &str = "⚠️ Failed to summarize. Please try again.";
pub const TRANSPORT_FAILURE: &str = "⚠️ Backend error. Is the summarization server running?";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    /// Decodable response without a usable `summary` field.
    #[error("response carried no usable summary")]
    MissingSummary,
    /// Non-2xx status with a JSON body.
    #[error("summarization service answered {0}")]
    Rejected(StatusCode),
    #[error("summarization service unreachable: {0}")]
    Transport(String),
    #[error("summarization response could not be decoded: {0}")]
    Decode(String),
}

impl SummarizeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SummarizeError::MissingSummary | SummarizeError::Rejected(_) => PAYLOAD_FAILURE,
            SummarizeError::Transport(_) | SummarizeError::Decode(_) => TRANSPORT_FAILURE,
        }
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
}

/// `POST {base}/summarize` with `{"text": ...}`; success is a non-empty string `summary`.
#[derive(Clone)]
pub struct HttpSummarizer {
    client: Client,
    base_url: String,
}

impl HttpSummarizer {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/summarize", self.base_url)
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&SummarizeRequest { text })
            .send()
            .await
            .map_err(|e| SummarizeError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| SummarizeError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(SummarizeError::Rejected(status));
        }
        extract_summary(&body)
    }
}

pub fn extract_summary(body: &Value) -> Result<String, SummarizeError> {
    match body.get("summary").and_then(Value::as_str) {
        Some(summary) if !summary.is_empty() => Ok(summary.to_string()),
        _ => Err(SummarizeError::MissingSummary),
    }
}
