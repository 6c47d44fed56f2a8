use async_trait::async_trait;
use common::helper::error_chain_fmt;
use uuid::Uuid;

use crate::domain::entities::content_point::{ContentMatch, ContentPoint, Embeddings};

/// Vector index of the contents
#[async_trait]
pub trait ContentPointRepository: Send + Sync {
    /// Inserts or replaces the point with the same id
    async fn upsert(&self, content_point: ContentPoint) -> Result<(), ContentPointRepositoryError>;

    /// Nearest neighbours of `vector` among the points owned by `owner_id`, best first
    async fn search(
        &self,
        owner_id: Uuid,
        vector: Embeddings,
        limit: u64,
    ) -> Result<Vec<ContentMatch>, ContentPointRepositoryError>;

    /// Deleting a point that does not exist is not an error
    async fn delete(&self, content_id: Uuid) -> Result<(), ContentPointRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum ContentPointRepositoryError {
    #[error("Error from the vector index: {0}")]
    IndexError(String),
    #[error("Error from the vector index config: {0}")]
    ConfigurationError(String),
    #[error("Invalid point returned by the vector index: {0}")]
    InvalidPoint(String),
}

impl std::fmt::Debug for ContentPointRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
