//! Embedding providers and the availability-aware service wrapped around them.
//!
//! Providers implement [`EmbeddingClient`] and report failures as errors. The rest of the
//! pipeline never sees those errors directly: [`EmbeddingService`] turns them into
//! [`Embedded::Unavailable`], so scoring and refinement can degrade instead of failing.

mod hashing;
mod ollama;

pub use hashing::HashingEmbeddingClient;
pub use ollama::OllamaEmbeddingClient;

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider is disabled or could not be reached.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider response could not be decoded or did not match the request.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce one embedding vector per supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Result of an embedding request that cannot fail, only be unavailable.
#[derive(Debug, Clone, PartialEq)]
pub enum Embedded<T> {
    /// Provider produced a value.
    Ready(T),
    /// Provider could not serve the request.
    Unavailable {
        /// Human-readable cause, for logs.
        reason: String,
    },
}

impl<T> Embedded<T> {
    /// Borrow the value when available.
    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    /// Take the value when available.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether a value was produced.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Provider that is never available (`EMBEDDING_PROVIDER=none`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmbeddingClient;

#[async_trait]
impl EmbeddingClient for DisabledEmbeddingClient {
    async fn generate_embeddings(
        &self,
        _texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        Err(EmbeddingClientError::ProviderUnavailable(
            "embedding provider disabled".to_string(),
        ))
    }
}

/// Single and batch embedding over an injected provider.
pub struct EmbeddingService {
    client: Box<dyn EmbeddingClient + Send + Sync>,
}

impl EmbeddingService {
    /// Wrap a provider.
    pub fn new(client: Box<dyn EmbeddingClient + Send + Sync>) -> Self {
        Self { client }
    }

    /// Embed one text.
    pub async fn embed(&self, text: &str) -> Embedded<Vec<f32>> {
        match self.embed_batch(&[text.to_string()]).await {
            Embedded::Ready(mut vectors) => match vectors.pop() {
                Some(vector) => Embedded::Ready(vector),
                None => Embedded::Unavailable {
                    reason: "provider returned no vector".to_string(),
                },
            },
            Embedded::Unavailable { reason } => Embedded::Unavailable { reason },
        }
    }

    /// Embed several texts in one provider call. An empty batch never reaches the provider.
    pub async fn embed_batch(&self, texts: &[String]) -> Embedded<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Embedded::Ready(Vec::new());
        }
        match self.client.generate_embeddings(texts.to_vec()).await {
            Ok(vectors) if vectors.len() == texts.len() => Embedded::Ready(vectors),
            Ok(vectors) => {
                let reason = format!(
                    "provider returned {} vectors for {} inputs",
                    vectors.len(),
                    texts.len()
                );
                tracing::warn!(%reason, "Embedding batch size mismatch");
                Embedded::Unavailable { reason }
            }
            Err(error) => {
                tracing::warn!(error = %error, inputs = texts.len(), "Embedding unavailable");
                Embedded::Unavailable {
                    reason: error.to_string(),
                }
            }
        }
    }
}

/// Build the provider selected by configuration.
pub fn get_embedding_client(
    config: &Config,
) -> Result<Box<dyn EmbeddingClient + Send + Sync>, EmbeddingClientError> {
    tracing::debug!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        dimension = config.embedding_dimension,
        "Building embedding client"
    );
    Ok(match config.embedding_provider {
        EmbeddingProvider::Hashing => {
            Box::new(HashingEmbeddingClient::new(config.embedding_dimension))
        }
        EmbeddingProvider::Ollama => Box::new(OllamaEmbeddingClient::new(
            config.ollama_url.clone(),
            config.embedding_model.clone(),
        )?),
        EmbeddingProvider::None => Box::new(DisabledEmbeddingClient),
    })
}
