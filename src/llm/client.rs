use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Shown in place of a reply whenever the remote call does not succeed.
pub const FAILURE_MESSAGE: &str = "Error: Unable to fetch response from the remote API.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// 401 or 403.
    Unauthorized(u16),
    /// 429.
    RateLimited,
    /// Any other non-200 status.
    Status(u16),
    /// Connection, TLS or timeout failure.
    Transport(String),
    /// 200 with a body that is not the expected JSON.
    InvalidBody(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized(code) => write!(f, "remote API rejected the API key ({code})"),
            Self::RateLimited => write!(f, "remote API rate limit reached (429)"),
            Self::Status(code) => write!(f, "remote API returned status {code}"),
            Self::Transport(msg) => write!(f, "request to remote API failed: {msg}"),
            Self::InvalidBody(msg) => write!(f, "remote API returned an unreadable body: {msg}"),
        }
    }
}

impl std::error::Error for RemoteError {}

#[derive(Debug, Clone, Serialize)]
struct QueryRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct QueryResponse {
    response: Option<serde_json::Value>,
}

impl QueryResponse {
    /// Strings are returned as-is; other JSON values are shown as their JSON text.
    fn into_text(self) -> String {
        match self.response {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(text)) => text,
            Some(other) => other.to_string(),
        }
    }
}

/// Forwards a question to the text-generation endpoint. One request per call, no retry.
#[derive(Debug, Clone)]
pub struct QueryProxy {
    client: reqwest::Client,
    endpoint: String,
    max_tokens: u32,
}

impl QueryProxy {
    pub fn new(endpoint: &str, max_tokens: u32, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    timeout_secs = timeout.as_secs(),
                    "http client build failed, request timeout not applied"
                );
                reqwest::Client::new()
            });

        Self {
            client,
            endpoint: endpoint.to_string(),
            max_tokens,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_endpoint, config.max_tokens, config.request_timeout)
    }

    /// Non-200 statuses and unreadable bodies are errors; callers show [`FAILURE_MESSAGE`].
    pub async fn ask(&self, question: &str, api_key: &str) -> Result<String, RemoteError> {
        let request = QueryRequest {
            prompt: question,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "remote API error body");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized(status.as_u16()),
                StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
                _ => RemoteError::Status(status.as_u16()),
            });
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidBody(e.to_string()))?;

        Ok(body.into_text())
    }
}
