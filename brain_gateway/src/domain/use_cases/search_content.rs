use common::helper::error_chain_fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::entities::content_point::ContentMatch,
    ports::{
        content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
        embedding_service::{EmbeddingService, EmbeddingServiceError},
    },
};

/// Number of nearest neighbours returned by a search
pub const SEARCH_LIMIT: u64 = 10;

/// Semantic search among the contents of a single user
pub struct SearchContentUseCase {
    content_point_repository: Arc<dyn ContentPointRepository>,
    embedding_service: Arc<dyn EmbeddingService>,
}

impl SearchContentUseCase {
    pub fn new(
        content_point_repository: Arc<dyn ContentPointRepository>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            content_point_repository,
            embedding_service,
        }
    }

    /// Matches are returned as ranked by the vector index
    #[tracing::instrument(name = "Searching contents", skip(self, query))]
    pub async fn execute(
        &self,
        owner_id: Uuid,
        query: &str,
    ) -> Result<Vec<ContentMatch>, SearchContentError> {
        if query.trim().is_empty() {
            return Err(SearchContentError::ValidationError(
                "`q` must not be empty".into(),
            ));
        }

        let vector = self.embedding_service.generate_embeddings(query).await?;

        let matches = self
            .content_point_repository
            .search(owner_id, vector, SEARCH_LIMIT)
            .await?;

        info!(nb_matches = matches.len(), "Searched contents");
        Ok(matches)
    }
}

#[derive(thiserror::Error)]
pub enum SearchContentError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to generate embeddings")]
    EmbeddingError(#[from] EmbeddingServiceError),
    #[error("Failed to query the vector index")]
    IndexQueryError(#[from] ContentPointRepositoryError),
}

impl std::fmt::Debug for SearchContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
