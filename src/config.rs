use clap::{Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;

use crate::kernel::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdentityBackend {
    /// Local accounts table, nothing leaves the process.
    Memory,
    /// Firebase Authentication over its REST API.
    Firebase,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "notewise", about = "Summarize your notes from the terminal")]
pub struct ClientConfig {
    /// Base URL of the summarization service.
    #[arg(long, env = "NOTEWISE_SUMMARIZER_URL", default_value = "http://127.0.0.1:8000")]
    pub summarizer_url: String,

    /// Transport-level timeout for outbound calls. Unset means wait for the transport.
    #[arg(long, env = "NOTEWISE_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, value_enum, env = "NOTEWISE_IDENTITY", default_value = "memory")]
    pub identity: IdentityBackend,

    #[arg(long, env = "NOTEWISE_FIREBASE_API_KEY", hide_env_values = true)]
    pub firebase_api_key: Option<String>,

    /// Location to open first.
    #[arg(long, default_value = "/")]
    pub route: Route,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the firebase identity backend needs --firebase-api-key")]
    MissingApiKey,
    #[error("summarizer url must start with http:// or https://, got {0}")]
    BadSummarizerUrl(String),
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.summarizer_url.starts_with("http://") || self.summarizer_url.starts_with("https://"))
        {
            return Err(ConfigError::BadSummarizerUrl(self.summarizer_url.clone()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.identity == IdentityBackend::Firebase
            && self.firebase_api_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
