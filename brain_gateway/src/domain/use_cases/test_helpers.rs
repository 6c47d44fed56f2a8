use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            content::{ContentItem, IndexStatus},
            content_point::{ContentMatch, ContentPoint, Embeddings},
        },
        services::hashing_embedding::HashingEmbeddingsService,
        use_cases::delete_content::DeleteContentUseCase,
    },
    ports::{
        content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
        content_repository::{ContentRepository, ContentRepositoryError},
        embedding_service::{EmbeddingService, EmbeddingServiceError},
    },
    repositories::{
        content_in_memory_repository::ContentInMemoryRepository,
        content_point_in_memory_repository::ContentPointInMemoryRepository,
    },
};

pub const TEST_DIMENSION: usize = 256;

/// Vector index that can be switched to failing, delegating to an in-memory one otherwise
#[derive(Default)]
pub struct ToggleableContentPointRepository {
    pub inner: ContentPointInMemoryRepository,
    pub failing: AtomicBool,
    pub nb_upserts: AtomicUsize,
}

impl ToggleableContentPointRepository {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ContentPointRepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ContentPointRepositoryError::IndexError(
                "index unreachable".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentPointRepository for ToggleableContentPointRepository {
    async fn upsert(&self, content_point: ContentPoint) -> Result<(), ContentPointRepositoryError> {
        self.check()?;
        self.nb_upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(content_point).await
    }

    async fn search(
        &self,
        owner_id: Uuid,
        vector: Embeddings,
        limit: u64,
    ) -> Result<Vec<ContentMatch>, ContentPointRepositoryError> {
        self.check()?;
        self.inner.search(owner_id, vector, limit).await
    }

    async fn delete(&self, content_id: Uuid) -> Result<(), ContentPointRepositoryError> {
        self.check()?;
        self.inner.delete(content_id).await
    }
}

/// Vector index whose owner deletes the content right before every upsert lands
///
/// Reproduces a delete request interleaved between the store write and the index
/// write of an ingestion or a reindexation.
pub struct DeletedBeforeUpsertContentPointRepository {
    pub contents: Arc<ContentInMemoryRepository>,
    pub inner: Arc<ContentPointInMemoryRepository>,
}

#[async_trait]
impl ContentPointRepository for DeletedBeforeUpsertContentPointRepository {
    async fn upsert(&self, content_point: ContentPoint) -> Result<(), ContentPointRepositoryError> {
        DeleteContentUseCase::new(self.contents.clone(), self.inner.clone())
            .execute(content_point.payload.owner_id, content_point.id)
            .await
            .map_err(|e| ContentPointRepositoryError::IndexError(e.to_string()))?;

        self.inner.upsert(content_point).await
    }

    async fn search(
        &self,
        owner_id: Uuid,
        vector: Embeddings,
        limit: u64,
    ) -> Result<Vec<ContentMatch>, ContentPointRepositoryError> {
        self.inner.search(owner_id, vector, limit).await
    }

    async fn delete(&self, content_id: Uuid) -> Result<(), ContentPointRepositoryError> {
        self.inner.delete(content_id).await
    }
}

/// Content store that is always down
#[derive(Default)]
pub struct FailingContentRepository {
    pub nb_saves: AtomicUsize,
}

fn store_down() -> ContentRepositoryError {
    ContentRepositoryError::Unavailable("store unreachable".into())
}

#[async_trait]
impl ContentRepository for FailingContentRepository {
    async fn save(&self, _content: &ContentItem) -> Result<(), ContentRepositoryError> {
        self.nb_saves.fetch_add(1, Ordering::SeqCst);
        Err(store_down())
    }

    async fn list_by_owner(
        &self,
        _owner_id: Uuid,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        Err(store_down())
    }

    async fn find(
        &self,
        _owner_id: Uuid,
        _content_id: Uuid,
    ) -> Result<Option<ContentItem>, ContentRepositoryError> {
        Err(store_down())
    }

    async fn delete(&self, _owner_id: Uuid, _content_id: Uuid) -> Result<bool, ContentRepositoryError> {
        Err(store_down())
    }

    async fn update_index_status(
        &self,
        _content_id: Uuid,
        _index_status: IndexStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<bool, ContentRepositoryError> {
        Err(store_down())
    }

    async fn record_index_failure(
        &self,
        _content_id: Uuid,
        _failed_at: DateTime<Utc>,
    ) -> Result<(), ContentRepositoryError> {
        Err(store_down())
    }

    async fn list_pending_index(
        &self,
        _limit: usize,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        Err(store_down())
    }
}

/// Embeddings service that always fails, counting its calls
#[derive(Default)]
pub struct FailingEmbeddingService {
    pub nb_calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingService for FailingEmbeddingService {
    fn dimension(&self) -> usize {
        TEST_DIMENSION
    }

    async fn generate_embeddings(&self, _text: &str) -> Result<Embeddings, EmbeddingServiceError> {
        self.nb_calls.fetch_add(1, Ordering::SeqCst);
        Err(EmbeddingServiceError::ApiError {
            status: 503,
            message: "unavailable".into(),
        })
    }
}

pub struct Fixture {
    pub contents: Arc<ContentInMemoryRepository>,
    pub points: Arc<ToggleableContentPointRepository>,
    pub embeddings: Arc<HashingEmbeddingsService>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(ContentInMemoryRepository::new()),
            points: Arc::new(ToggleableContentPointRepository::default()),
            embeddings: Arc::new(HashingEmbeddingsService::new(TEST_DIMENSION)),
        }
    }
}
