//! LLM client: the single point of entry for all generative-model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the chat completion API directly.
//! All LLM interactions MUST go through this module.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. One attempt per
//! call, bounded by the configured timeout; there is no retry.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing OPENAI_API_KEY. LLM-driven skills require this env var.")]
    MissingApiKey,

    #[error("LLM request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("LLM network request failed for {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("LLM request failed: {status} {message}")]
    Api { status: u16, message: String },

    #[error("LLM response content is empty")]
    EmptyContent,

    #[error("LLM response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("LLM response JSON schema validation failed: expected a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single role-tagged chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice, if non-empty.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// The single LLM client used by all services.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    endpoint: String,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Makes a single call to the chat completion endpoint.
    pub async fn call(&self, messages: &[ChatMessage]) -> Result<ChatResponse, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let chat: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }

    /// Calls the LLM and parses the response content as a JSON object.
    /// The messages must instruct the model to return valid JSON.
    pub async fn call_json(&self, messages: &[ChatMessage]) -> Result<Value, LlmError> {
        let response = self.call(messages).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        parse_json_object(text)
    }

    fn transport_error(&self, source: reqwest::Error) -> LlmError {
        if source.is_timeout() {
            LlmError::Timeout(self.config.timeout)
        } else {
            LlmError::Http {
                endpoint: self.endpoint.clone(),
                source,
            }
        }
    }
}

/// Parses model output into a JSON object, tolerating code fences.
pub fn parse_json_object(text: &str) -> Result<Value, LlmError> {
    let value: Value = serde_json::from_str(strip_json_fences(text))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(LlmError::NotAnObject)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_object_rejects_arrays() {
        assert!(matches!(
            parse_json_object("[1, 2, 3]"),
            Err(LlmError::NotAnObject)
        ));
    }

    #[test]
    fn test_parse_json_object_rejects_prose() {
        assert!(matches!(
            parse_json_object("Sure! Here is your analysis."),
            Err(LlmError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_chat_response_text_skips_blank_content() {
        let raw = r#"{"choices": [{"message": {"content": "   "}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(response.text().is_none());

        let raw = r#"{"choices": []}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = ChatRequest {
            model: "gpt-4o-mini",
            temperature: 0.2,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: &messages,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = LlmClient::new(LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();

        let err = client
            .call_json(&[ChatMessage::user("hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
