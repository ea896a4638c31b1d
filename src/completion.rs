//! Chat completion client for OpenAI-compatible APIs.
//!
//! The default configuration points at OpenRouter, but any service exposing
//! `POST {base_url}/chat/completions` works. Requests carry the configured
//! timeout and are never retried.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::CompletionConfig;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected completion response: {0}")]
    Malformed(String),
}

impl CompletionError {
    /// Renders the error as a chat reply. Callers that want to answer a user
    /// instead of failing the request surface this string as the reply body.
    pub fn to_reply(&self) -> String {
        format!("⚠️ API Error: {}", self)
    }
}

/// Interface to a chat model. One call sends a system message and a user
/// message and returns the assistant's reply text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}

/// Client for OpenAI-compatible chat completion APIs.
///
/// The API key is read once at construction from the environment variable
/// named by `completion.api_key_env`.
pub struct OpenAiCompatibleClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!("{} environment variable not set", config.api_key_env)
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let json: serde_json::Value = response.json().await?;
        parse_completion_response(&json)
    }
}

/// Extracts the reply text from a chat completion response, i.e. the
/// `choices[0].message.content` field.
fn parse_completion_response(json: &serde_json::Value) -> Result<String, CompletionError> {
    let first = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| CompletionError::Malformed("no choices in response".to_string()))?;

    let content = first
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            CompletionError::Malformed("first choice has no message content".to_string())
        })?;

    Ok(content.to_string())
}

/// Create the chat completion client named by the configuration.
pub fn create_client(config: &CompletionConfig) -> Result<Box<dyn CompletionProvider>> {
    Ok(Box::new(OpenAiCompatibleClient::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_is_extracted() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "You need a study permit."}}
            ]
        });
        let reply = parse_completion_response(&json).unwrap();
        assert_eq!(reply, "You need a study permit.");
    }

    #[test]
    fn extra_choices_are_ignored() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"content": "first"}},
                {"message": {"content": "second"}},
            ]
        });
        assert_eq!(parse_completion_response(&json).unwrap(), "first");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let json = serde_json::json!({"choices": []});
        let err = parse_completion_response(&json).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn missing_content_is_malformed() {
        let json = serde_json::json!({"choices": [{"message": {"role": "assistant"}}]});
        let err = parse_completion_response(&json).unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }

    #[test]
    fn non_string_content_is_malformed() {
        let json = serde_json::json!({"choices": [{"message": {"content": 42}}]});
        assert!(parse_completion_response(&json).is_err());
    }

    #[test]
    fn reply_rendering_keeps_the_error_detail() {
        let err = CompletionError::Malformed("no choices in response".to_string());
        let reply = err.to_reply();
        assert!(reply.starts_with("⚠️ API Error: "));
        assert!(reply.contains("no choices in response"));
    }

    #[test]
    fn missing_api_key_fails_construction() {
        let config = CompletionConfig {
            api_key_env: "ASKBASE_TEST_MISSING_COMPLETION_KEY".to_string(),
            ..CompletionConfig::default()
        };
        let err = OpenAiCompatibleClient::new(&config).map(|_| ()).unwrap_err();
        assert!(err
            .to_string()
            .contains("ASKBASE_TEST_MISSING_COMPLETION_KEY environment variable not set"));
    }
}
