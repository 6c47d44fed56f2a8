use chrono::Utc;
use common::helper::error_chain_fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::entities::{
        content::{ContentItem, IndexStatus},
        content_point::ContentPoint,
    },
    ports::{
        content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
        content_repository::{ContentRepository, ContentRepositoryError},
        embedding_service::{EmbeddingService, EmbeddingServiceError},
    },
};

/// Writes again the vector index entry of contents
///
/// Upserts are keyed by the content id: reindexing an already indexed content
/// replaces its entry. A content deleted while being reindexed has its freshly
/// written entry removed.
pub struct ReindexContentUseCase {
    content_repository: Arc<dyn ContentRepository>,
    content_point_repository: Arc<dyn ContentPointRepository>,
    embedding_service: Arc<dyn EmbeddingService>,
}

/// Outcome of a batch of reindexations
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReindexReport {
    pub reindexed: usize,
    pub failed: usize,
}

impl ReindexContentUseCase {
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

    /// Reindexes a single content of a user
    #[tracing::instrument(name = "Reindexing content", skip(self))]
    pub async fn execute(
        &self,
        owner_id: Uuid,
        content_id: Uuid,
    ) -> Result<ContentItem, ReindexContentError> {
        let content = self
            .content_repository
            .find(owner_id, content_id)
            .await
            .map_err(ReindexContentError::StoreReadError)?
            .ok_or(ReindexContentError::NotFound(content_id))?;

        self.reindex(content).await
    }

    /// Reindexes up to `batch_size` pending contents, whoever their owner
    ///
    /// A failing content is logged and counted, it does not stop the batch. Its failure
    /// is recorded so that it moves behind the other pending contents in the next batches.
    #[tracing::instrument(name = "Reindexing pending contents", skip(self))]
    pub async fn reindex_pending(
        &self,
        batch_size: usize,
    ) -> Result<ReindexReport, ReindexContentError> {
        let pending = self
            .content_repository
            .list_pending_index(batch_size)
            .await
            .map_err(ReindexContentError::StoreReadError)?;

        let mut report = ReindexReport::default();
        for content in pending {
            let content_id = content.id;
            match self.reindex(content).await {
                Ok(_) => report.reindexed += 1,
                // Deleted meanwhile: nothing left to index
                Err(ReindexContentError::NotFound(_)) => {}
                Err(error) => {
                    warn!(?error, %content_id, "Could not reindex content");
                    report.failed += 1;

                    if let Err(error) = self
                        .content_repository
                        .record_index_failure(content_id, Utc::now())
                        .await
                    {
                        warn!(?error, %content_id, "Could not record the reindexation failure");
                    }
                }
            }
        }

        if report.reindexed + report.failed > 0 {
            info!(
                reindexed = report.reindexed,
                failed = report.failed,
                "Reindexed pending contents"
            );
        }
        Ok(report)
    }

    async fn reindex(&self, mut content: ContentItem) -> Result<ContentItem, ReindexContentError> {
        let vector = self
            .embedding_service
            .generate_embeddings(&content.embedding_text())
            .await?;

        self.content_point_repository
            .upsert(ContentPoint::new(&content, vector))
            .await?;

        let indexed_at = Utc::now();
        let updated = self
            .content_repository
            .update_index_status(content.id, IndexStatus::Indexed, indexed_at)
            .await
            .map_err(ReindexContentError::StoreWriteError)?;

        if !updated {
            warn!(content_id = %content.id, "Content deleted while being reindexed");
            self.content_point_repository.delete(content.id).await?;
            return Err(ReindexContentError::NotFound(content.id));
        }

        content.index_status = IndexStatus::Indexed;
        content.updated_at = indexed_at;
        Ok(content)
    }
}

#[derive(thiserror::Error)]
pub enum ReindexContentError {
    #[error("Content {0} not found")]
    NotFound(Uuid),
    #[error("Failed to read contents")]
    StoreReadError(#[source] ContentRepositoryError),
    #[error("Failed to update the content index status")]
    StoreWriteError(#[source] ContentRepositoryError),
    #[error("Failed to generate embeddings")]
    EmbeddingError(#[from] EmbeddingServiceError),
    #[error("Failed to write the vector index entry")]
    IndexWriteError(#[from] ContentPointRepositoryError),
}

impl std::fmt::Debug for ReindexContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
