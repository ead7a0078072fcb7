//! Completion client for the Segmind-hosted Claude endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{CompletionError, CompletionResult};
use crate::traits::CompletionClient;

const DEFAULT_ENDPOINT: &str = "https://api.segmind.com/v1/claude-3.5-sonnet";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct CompletionRequest<'a> {
    instruction: &'a str,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Talks to a Segmind completion endpoint over HTTPS.
pub struct SegmindClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SegmindClient {
    pub fn new(api_key: impl Into<String>) -> CompletionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CompletionError::Transport(Box::new(e)))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Pull the completion text out of the provider's response envelope.
    /// Segmind has shipped several shapes; try each known one.
    fn extract_content(value: &Value) -> Option<String> {
        if let Some(text) = value
            .pointer("/content/0/text")
            .and_then(Value::as_str)
        {
            return Some(text.to_string());
        }
        if let Some(text) = value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
        {
            return Some(text.to_string());
        }
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return Some(text.to_string());
        }
        if let Some(text) = value.get("output").and_then(Value::as_str) {
            return Some(text.to_string());
        }
        None
    }
}

#[async_trait]
impl CompletionClient for SegmindClient {
    async fn complete(
        &self,
        instruction: &str,
        prompt: &str,
        temperature: f32,
    ) -> CompletionResult<String> {
        let request = CompletionRequest {
            instruction,
            temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(endpoint = %self.endpoint, temperature, prompt_len = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(Box::new(e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(Box::new(e)))?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| CompletionError::Transport(Box::new(e)))?;

        Self::extract_content(&value).ok_or(CompletionError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_anthropic_shape() {
        let value = json!({ "content": [{ "type": "text", "text": "hello" }] });
        assert_eq!(SegmindClient::extract_content(&value).as_deref(), Some("hello"));
    }

    #[test]
    fn extracts_openai_shape() {
        let value = json!({ "choices": [{ "message": { "content": "hi" } }] });
        assert_eq!(SegmindClient::extract_content(&value).as_deref(), Some("hi"));
    }

    #[test]
    fn extracts_flat_shapes() {
        assert_eq!(
            SegmindClient::extract_content(&json!({ "text": "a" })).as_deref(),
            Some("a")
        );
        assert_eq!(
            SegmindClient::extract_content(&json!({ "output": "b" })).as_deref(),
            Some("b")
        );
        assert!(SegmindClient::extract_content(&json!({ "nope": 1 })).is_none());
    }
}
