use common::helper::error_chain_fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ports::{
    content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
    content_repository::{ContentRepository, ContentRepositoryError},
};

/// Deletes a content of a user, and its vector index entry
///
/// The index entry is removed first: if that fails the content is kept intact, and a
/// search can never return a deleted content. It is removed again once the content is
/// gone, in case an ingestion or a reindexation wrote it back in between.
pub struct DeleteContentUseCase {
    content_repository: Arc<dyn ContentRepository>,
    content_point_repository: Arc<dyn ContentPointRepository>,
}

impl DeleteContentUseCase {
    pub fn new(
        content_repository: Arc<dyn ContentRepository>,
        content_point_repository: Arc<dyn ContentPointRepository>,
    ) -> Self {
        Self {
            content_repository,
            content_point_repository,
        }
    }

    #[tracing::instrument(name = "Deleting content", skip(self))]
    pub async fn execute(&self, owner_id: Uuid, content_id: Uuid) -> Result<(), DeleteContentError> {
        self.content_repository
            .find(owner_id, content_id)
            .await
            .map_err(DeleteContentError::StoreReadError)?
            .ok_or(DeleteContentError::NotFound(content_id))?;

        self.content_point_repository
            .delete(content_id)
            .await
            .map_err(DeleteContentError::IndexDeleteError)?;

        let deleted = self
            .content_repository
            .delete(owner_id, content_id)
            .await
            .map_err(DeleteContentError::StoreDeleteError)?;

        if !deleted {
            // Deleted concurrently, between the lookup and now
            return Err(DeleteContentError::NotFound(content_id));
        }

        if let Err(error) = self.content_point_repository.delete(content_id).await {
            warn!(?error, "Content deleted but its vector index entry could not be swept");
        }

        info!("Deleted content");
        Ok(())
    }
}

#[derive(thiserror::Error)]
pub enum DeleteContentError {
    #[error("Content {0} not found")]
    NotFound(Uuid),
    #[error("Failed to read content")]
    StoreReadError(#[source] ContentRepositoryError),
    #[error("Failed to delete the vector index entry")]
    IndexDeleteError(#[source] ContentPointRepositoryError),
    #[error("Failed to delete content")]
    StoreDeleteError(#[source] ContentRepositoryError),
}

impl std::fmt::Debug for DeleteContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
