//! ClaudeApiAgent - Direct REST API implementation for Claude.

use std::time::Duration;

use async_trait::async_trait;
use citeflow_core::error::{CiteError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentRequest, TextAgent, map_http_error, map_transport_error, parse_retry_after};

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Agent implementation that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiAgent {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 4096,
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Applies a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }

    fn build_request(&self, request: AgentRequest) -> CreateMessageRequest {
        CreateMessageRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock::Text {
                    text: request.prompt,
                }],
            }],
            max_tokens: self.max_tokens,
            system: request.system,
        }
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String> {
        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error("Claude API", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body_text)
                .map(|wrapper| wrapper.error.message)
                .unwrap_or(body_text);
            return Err(map_http_error(status, message, retry_after));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            CiteError::provider(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextAgent for ClaudeApiAgent {
    fn expertise(&self) -> &str {
        "Claude API agent for reference search"
    }

    async fn execute(&self, request: AgentRequest) -> Result<String> {
        let body = self.build_request(request);
        self.send_request(&body).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .ok_or_else(|| CiteError::provider("Claude API returned no text in the response content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let agent = ClaudeApiAgent::new("k", DEFAULT_CLAUDE_MODEL).with_max_tokens(1000);
        let body = serde_json::to_value(
            agent.build_request(AgentRequest::new("find refs").with_model(Some("claude-haiku"))),
        )
        .unwrap();

        assert_eq!(body["model"], "claude-haiku");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert_eq!(body["messages"][0]["content"][0]["text"], "find refs");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_extract_skips_non_text_blocks() {
        let response: CreateMessageResponse = serde_json::from_str(
            r#"{"content":[{"type":"tool_use","id":"x"},{"type":"text","text":"[]"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "[]");
    }
}
