//! Text-generation agent seam shared by the HTTP backends.

use std::time::Duration;

use async_trait::async_trait;
use citeflow_core::error::{CiteError, Result};
use reqwest::{StatusCode, header::HeaderValue};

/// A single prompt sent to a text-generation backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRequest {
    pub prompt: String,
    pub system: Option<String>,
    /// Per-request model override.
    pub model: Option<String>,
}

impl AgentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the model override; blank values are ignored.
    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        self
    }
}

/// A backend that turns a prompt into raw text.
#[async_trait]
pub trait TextAgent: Send + Sync {
    fn expertise(&self) -> &str;

    async fn execute(&self, request: AgentRequest) -> Result<String>;
}

/// Agent standing in for a backend whose credentials are missing.
///
/// Construction never fails; every request reports the missing credentials
/// as a provider error so the owning session shows it.
pub struct UnconfiguredAgent {
    reason: String,
}

impl UnconfiguredAgent {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextAgent for UnconfiguredAgent {
    fn expertise(&self) -> &str {
        "unconfigured backend"
    }

    async fn execute(&self, _request: AgentRequest) -> Result<String> {
        Err(CiteError::provider(self.reason.clone()))
    }
}

pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Maps a transport failure before any HTTP status was received.
pub(crate) fn map_transport_error(backend: &str, err: reqwest::Error) -> CiteError {
    CiteError::Provider {
        message: format!("{backend} request failed: {err}"),
        status_code: None,
        retryable: err.is_connect() || err.is_timeout(),
    }
}

/// Maps a non-success HTTP response. `message` is the backend's own error
/// text when it could be extracted from the body.
pub(crate) fn map_http_error(
    status: StatusCode,
    message: String,
    retry_after: Option<Duration>,
) -> CiteError {
    let message = match retry_after {
        Some(delay) => format!("{message} (retry after {}s)", delay.as_secs()),
        None => message,
    };
    CiteError::provider_status(status.as_u16(), message, is_retryable_status(status))
}

pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // Retry-After HTTP-date parsing is omitted for simplicity
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_model_override_ignored() {
        let request = AgentRequest::new("p").with_model(Some("  "));
        assert!(request.model.is_none());
        let request = AgentRequest::new("p").with_model(Some("gpt-4o"));
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_http_error_retryability() {
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, "slow down".into(), None);
        assert!(err.is_retryable());
        let err = map_http_error(StatusCode::UNAUTHORIZED, "bad key".into(), None);
        assert!(!err.is_retryable());
        assert!(err.is_provider());
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let header = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&header)), Some(Duration::from_secs(12)));
        let header = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&header)), None);
    }

    #[tokio::test]
    async fn test_unconfigured_agent_reports_provider_error() {
        let agent = UnconfiguredAgent::new("GEMINI_API_KEY not set");
        let err = agent.execute(AgentRequest::new("hi")).await.unwrap_err();
        assert!(err.is_provider());
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
