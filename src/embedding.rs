//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and two concrete backends:
//! - [`OpenAiEmbedder`]: OpenAI-compatible `POST /v1/embeddings` API.
//! - [`OllamaEmbedder`]: local Ollama server (`POST /api/embed`).
//!
//! Requests carry the configured timeout and fail on the first error. There
//! is no retry loop; callers decide how to surface a [`ProviderError`].
//!
//! # Provider Selection
//!
//! Use [`create_provider`] to instantiate the backend named by the
//! configuration:
//!
//! ```rust,no_run
//! # use askbase::config::EmbeddingConfig;
//! # use askbase::embedding::create_provider;
//! let config = EmbeddingConfig {
//!     provider: "ollama".to_string(),
//!     model: "nomic-embed-text".to_string(),
//!     url: None,
//!     api_key_env: None,
//!     batch_size: 64,
//!     timeout_secs: 30,
//! };
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "nomic-embed-text");
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::EmbeddingConfig;

/// Default endpoint for the OpenAI embeddings API.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
/// Environment variable consulted when `embedding.api_key_env` is not set.
const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
/// Default base URL of a local Ollama server.
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("embedding API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected embedding response: {0}")]
    Malformed(String),
}

/// Interface shared by all embedding backends.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Embeds a batch of texts: one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embeds a single query text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("empty embedding response".to_string()))
    }
}

// ============ OpenAI Provider ============

/// Embedding backend for the OpenAI embeddings API, or any service that
/// speaks the same protocol when `embedding.url` points elsewhere.
///
/// The API key is read once at construction from the environment variable
/// named by `embedding.api_key_env` (default `OPENAI_API_KEY`).
pub struct OpenAiEmbedder {
    model: String,
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let key_env = config
            .api_key_env
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_KEY_ENV);
        let api_key = std::env::var(key_env)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", key_env))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OPENAI_EMBEDDINGS_URL.to_string()),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let json: serde_json::Value = response.json().await?;
        let vectors = parse_openai_response(&json)?;
        expect_count(&vectors, texts.len())?;
        Ok(vectors)
    }
}

/// Parses the OpenAI embeddings response. Items are reordered by their
/// reported `index` so output order always matches input order.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| ProviderError::Malformed("missing data array".to_string()))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| ProviderError::Malformed("missing embedding field".to_string()))?;

        let vector: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(position);

        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

// ============ Ollama Provider ============

/// Embedding backend for a local Ollama server. No API key is required.
pub struct OllamaEmbedder {
    model: String,
    url: String,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            url: config
                .url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });
        let url = format!("{}/api/embed", self.url.trim_end_matches('/'));

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let json: serde_json::Value = response.json().await?;
        let vectors = parse_ollama_response(&json)?;
        expect_count(&vectors, texts.len())?;
        Ok(vectors)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    let rows = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| ProviderError::Malformed("missing embeddings array".to_string()))?;

    rows.iter()
        .map(|row| {
            row.as_array()
                .map(|values| {
                    values
                        .iter()
                        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                        .collect()
                })
                .ok_or_else(|| {
                    ProviderError::Malformed("embedding row is not an array".to_string())
                })
        })
        .collect()
}

fn expect_count(vectors: &[Vec<f32>], want: usize) -> Result<(), ProviderError> {
    if vectors.len() != want {
        return Err(ProviderError::Malformed(format!(
            "expected {} embeddings, got {}",
            want,
            vectors.len()
        )));
    }
    Ok(())
}

/// Create the [`EmbeddingProvider`] named by the configuration.
///
/// # Errors
///
/// Returns an error for unknown provider names, or when the OpenAI backend
/// cannot find its API key in the environment.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiEmbedder::new(config)?)),
        "ollama" => Ok(Box::new(OllamaEmbedder::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}
