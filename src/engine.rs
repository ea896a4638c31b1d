use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::chunk::{self, Chunk};
use crate::completion::{self, CompletionError, CompletionProvider};
use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider, ProviderError};
use crate::extract;
use crate::index::{self, VectorIndex};
use crate::prompt;

/// Failure modes of answering a query end to end. Embedding failures and
/// chat failures are kept apart because callers surface them differently.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// One retrieval hit: the chunk plus its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub index: usize,
    pub score: f32,
    pub text: String,
}

/// Everything needed to answer questions: the chunked knowledge base, its
/// vector index, the embedding and completion backends, and the policy
/// document. Built once at startup and never mutated afterwards.
pub struct Engine {
    chunks: Vec<Chunk>,
    index: VectorIndex,
    embedder: Box<dyn EmbeddingProvider>,
    completion: Box<dyn CompletionProvider>,
    policy: String,
    top_k: usize,
}

impl Engine {
    pub fn new(
        chunks: Vec<Chunk>,
        index: VectorIndex,
        embedder: Box<dyn EmbeddingProvider>,
        completion: Box<dyn CompletionProvider>,
        policy: String,
        top_k: usize,
    ) -> Self {
        debug_assert_eq!(chunks.len(), index.len());
        Self {
            chunks,
            index,
            embedder,
            completion,
            policy,
            top_k,
        }
    }

    /// Loads the policy and the knowledge base, chunks the document, embeds
    /// every chunk, and builds the vector index.
    pub async fn bootstrap(config: &Config) -> Result<Self> {
        let policy = std::fs::read_to_string(&config.policy.path).with_context(|| {
            format!(
                "Failed to read policy document: {}",
                config.policy.path.display()
            )
        })?;

        info!(path = %config.source.path.display(), "loading knowledge base");
        let text = extract::extract_text(&config.source.path, config.source.max_extract_bytes)
            .with_context(|| {
                format!(
                    "Failed to extract knowledge base: {}",
                    config.source.path.display()
                )
            })?;

        let chunks = chunk::chunk_text(&text, &config.chunking);
        if chunks.is_empty() {
            anyhow::bail!("knowledge base produced no chunks (document too short or empty)");
        }
        info!(total = chunks.len(), "chunked knowledge base");

        let embedder = embedding::create_provider(&config.embedding)?;
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(config.embedding.batch_size) {
            let batch_vectors = embedder.embed(batch).await.with_context(|| {
                format!("Failed to embed chunks with {}", embedder.model_name())
            })?;
            vectors.extend(batch_vectors);
        }
        for vector in vectors.iter_mut() {
            index::normalize_l2(vector);
        }
        let index = VectorIndex::build(vectors)?;
        info!(entries = index.len(), dims = index.dims(), "built vector index");

        let completion = completion::create_client(&config.completion)?;

        Ok(Self::new(
            chunks,
            index,
            embedder,
            completion,
            policy,
            config.retrieval.top_k,
        ))
    }

    /// Retrieves the `k` chunk texts most similar to `query`, best first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, ProviderError> {
        Ok(self
            .retrieve_scored(query, k)
            .await?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Like [`retrieve`](Self::retrieve) but keeps chunk indices and scores.
    pub async fn retrieve_scored(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, ProviderError> {
        let mut query_vector = self.embedder.embed_one(query).await?;
        if query_vector.len() != self.index.dims() {
            return Err(ProviderError::Malformed(format!(
                "query embedding has {} dimensions, expected {}",
                query_vector.len(),
                self.index.dims()
            )));
        }
        index::normalize_l2(&mut query_vector);

        let hits = self.index.search(&query_vector, k);
        Ok(hits
            .into_iter()
            .map(|(position, score)| ScoredChunk {
                index: self.chunks[position].index,
                score,
                text: self.chunks[position].text.clone(),
            })
            .collect())
    }

    /// Answers a query end to end: retrieve context, assemble the prompt,
    /// call the chat model.
    pub async fn answer(&self, query: &str) -> Result<String, AnswerError> {
        let context = self.retrieve(query, self.top_k).await?;
        let prompt = prompt::assemble(&self.policy, &context, query);
        let reply = self.completion.complete(&prompt.system, &prompt.user).await?;
        Ok(reply)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
