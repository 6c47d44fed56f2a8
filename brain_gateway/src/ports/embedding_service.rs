use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::content_point::Embeddings;

/// Turns a text into a fixed-length vector
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Dimension of every vector this service generates
    fn dimension(&self) -> usize;

    async fn generate_embeddings(&self, text: &str) -> Result<Embeddings, EmbeddingServiceError>;
}

#[derive(thiserror::Error)]
pub enum EmbeddingServiceError {
    #[error("Embeddings request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Embeddings API responded with status {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("Malformed embeddings response: {0}")]
    MalformedResponse(String),
}

impl std::fmt::Debug for EmbeddingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
