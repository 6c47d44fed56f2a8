use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::helper::error_chain_fmt;
use uuid::Uuid;

use crate::domain::entities::content::{ContentItem, IndexStatus};

/// Per-user persistence of contents
///
/// Every read and delete is scoped by owner: a content can never be reached
/// through another user id.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn save(&self, content: &ContentItem) -> Result<(), ContentRepositoryError>;

    /// Contents of a user, oldest first
    async fn list_by_owner(&self, owner_id: Uuid)
        -> Result<Vec<ContentItem>, ContentRepositoryError>;

    async fn find(
        &self,
        owner_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<ContentItem>, ContentRepositoryError>;

    /// Returns `false` if there was nothing to delete
    async fn delete(&self, owner_id: Uuid, content_id: Uuid)
        -> Result<bool, ContentRepositoryError>;

    /// Sets the index status of a content, stamping `updated_at`
    ///
    /// Returns `false` if the content does not exist (anymore).
    async fn update_index_status(
        &self,
        content_id: Uuid,
        index_status: IndexStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ContentRepositoryError>;

    /// Remembers that indexing a pending content failed at `failed_at`
    async fn record_index_failure(
        &self,
        content_id: Uuid,
        failed_at: DateTime<Utc>,
    ) -> Result<(), ContentRepositoryError>;

    /// Contents of any user still waiting for their vector index entry
    ///
    /// Contents that never failed to be indexed come first, oldest first, then the
    /// ones whose last failure is the oldest.
    async fn list_pending_index(
        &self,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum ContentRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error("Corrupted content record {id}: {message}")]
    CorruptedRecord { id: Uuid, message: String },
    #[error("Content store unavailable: {0}")]
    Unavailable(String),
}

impl std::fmt::Debug for ContentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
