use chrono::Utc;
use common::helper::error_chain_fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::entities::{
        content::{ContentItem, ContentSubmission, ContentValidationError, IndexStatus, NewContent},
        content_point::ContentPoint,
    },
    ports::{
        content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
        content_repository::{ContentRepository, ContentRepositoryError},
        embedding_service::{EmbeddingService, EmbeddingServiceError},
    },
};

/// Validates, embeds, persists then indexes a content submitted by a user
///
/// Every step fails fast. Once the content is persisted, it is never rolled back:
/// if the vector index write fails the content stays `pending` and can be reindexed.
/// A content deleted while being indexed has its freshly written index entry removed.
pub struct IngestContentUseCase {
    content_repository: Arc<dyn ContentRepository>,
    content_point_repository: Arc<dyn ContentPointRepository>,
    embedding_service: Arc<dyn EmbeddingService>,
}

impl IngestContentUseCase {
    pub fn new(
        content_repository: Arc<dyn ContentRepository>,
        content_point_repository: Arc<dyn ContentPointRepository>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            content_repository,
            content_point_repository,
            embedding_service,
        }
    }

    #[tracing::instrument(name = "Ingesting content", skip(self, submission))]
    pub async fn execute(
        &self,
        owner_id: Uuid,
        submission: ContentSubmission,
    ) -> Result<ContentItem, IngestContentError> {
        let new_content = NewContent::parse(submission)?;

        let vector = self
            .embedding_service
            .generate_embeddings(&new_content.embedding_text())
            .await?;

        let mut content = new_content.into_content_item(owner_id);
        self.content_repository
            .save(&content)
            .await
            .map_err(IngestContentError::StoreWriteError)?;
        info!(content_id = %content.id, "Saved content, pending indexation");

        self.content_point_repository
            .upsert(ContentPoint::new(&content, vector))
            .await
            .map_err(|source| IngestContentError::IndexWriteError {
                content_id: content.id,
                source,
            })?;

        let indexed_at = Utc::now();
        match self
            .content_repository
            .update_index_status(content.id, IndexStatus::Indexed, indexed_at)
            .await
        {
            Ok(true) => {
                content.index_status = IndexStatus::Indexed;
                content.updated_at = indexed_at;
            }
            Ok(false) => {
                warn!(content_id = %content.id, "Content deleted while being indexed");
                self.content_point_repository
                    .delete(content.id)
                    .await
                    .map_err(|source| IngestContentError::IndexCleanupError {
                        content_id: content.id,
                        source,
                    })?;
                return Err(IngestContentError::ContentDeleted(content.id));
            }
            Err(error) => warn!(
                ?error,
                content_id = %content.id,
                "Content indexed but could not be marked as such, it will be reindexed"
            ),
        }

        Ok(content)
    }
}

#[derive(thiserror::Error)]
pub enum IngestContentError {
    #[error(transparent)]
    ValidationError(#[from] ContentValidationError),
    #[error("Failed to generate embeddings")]
    EmbeddingError(#[from] EmbeddingServiceError),
    #[error("Failed to save content")]
    StoreWriteError(#[source] ContentRepositoryError),
    #[error("Content {content_id} saved but not indexed")]
    IndexWriteError {
        content_id: Uuid,
        #[source]
        source: ContentPointRepositoryError,
    },
    #[error("Content {0} was deleted while being indexed")]
    ContentDeleted(Uuid),
    #[error("Content {content_id} was deleted but its vector index entry could not be removed")]
    IndexCleanupError {
        content_id: Uuid,
        #[source]
        source: ContentPointRepositoryError,
    },
}

impl std::fmt::Debug for IngestContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
