use common::helper::error_chain_fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::entities::content::ContentItem,
    ports::content_repository::{ContentRepository, ContentRepositoryError},
};

/// Lists every content of a user, oldest first
pub struct ListContentsUseCase {
    content_repository: Arc<dyn ContentRepository>,
}

impl ListContentsUseCase {
    pub fn new(content_repository: Arc<dyn ContentRepository>) -> Self {
        Self { content_repository }
    }

    #[tracing::instrument(name = "Listing contents", skip(self))]
    pub async fn execute(&self, owner_id: Uuid) -> Result<Vec<ContentItem>, ListContentsError> {
        Ok(self.content_repository.list_by_owner(owner_id).await?)
    }
}

#[derive(thiserror::Error)]
pub enum ListContentsError {
    #[error("Failed to read contents")]
    StoreReadError(#[from] ContentRepositoryError),
}

impl std::fmt::Debug for ListContentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
