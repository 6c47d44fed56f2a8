use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use uuid::Uuid;

use crate::{
    domain::entities::content::{ContentItem, IndexStatus},
    ports::content_repository::{ContentRepository, ContentRepositoryError},
};

/// Content store kept in the process memory
///
/// Nothing survives a restart: meant for local development and tests.
#[derive(Default)]
pub struct ContentInMemoryRepository {
    contents: RwLock<HashMap<Uuid, ContentItem>>,
    index_failures: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl ContentInMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, ContentItem>>, ContentRepositoryError> {
        self.contents
            .read()
            .map_err(|e| ContentRepositoryError::Unavailable(e.to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, ContentItem>>, ContentRepositoryError> {
        self.contents
            .write()
            .map_err(|e| ContentRepositoryError::Unavailable(e.to_string()))
    }

    fn index_failures(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, DateTime<Utc>>>, ContentRepositoryError> {
        self.index_failures
            .write()
            .map_err(|e| ContentRepositoryError::Unavailable(e.to_string()))
    }
}

fn sorted_oldest_first(mut contents: Vec<ContentItem>) -> Vec<ContentItem> {
    contents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    contents
}

#[async_trait]
impl ContentRepository for ContentInMemoryRepository {
    async fn save(&self, content: &ContentItem) -> Result<(), ContentRepositoryError> {
        self.write()?.insert(content.id, content.clone());
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let contents = self
            .read()?
            .values()
            .filter(|content| content.owner_id == owner_id)
            .cloned()
            .collect();

        Ok(sorted_oldest_first(contents))
    }

    async fn find(
        &self,
        owner_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<ContentItem>, ContentRepositoryError> {
        Ok(self
            .read()?
            .get(&content_id)
            .filter(|content| content.owner_id == owner_id)
            .cloned())
    }

    async fn delete(&self, owner_id: Uuid, content_id: Uuid) -> Result<bool, ContentRepositoryError> {
        let mut contents = self.write()?;

        match contents.get(&content_id) {
            Some(content) if content.owner_id == owner_id => {
                contents.remove(&content_id);
                self.index_failures()?.remove(&content_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_index_status(
        &self,
        content_id: Uuid,
        index_status: IndexStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ContentRepositoryError> {
        match self.write()?.get_mut(&content_id) {
            Some(content) => {
                content.index_status = index_status;
                content.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_index_failure(
        &self,
        content_id: Uuid,
        failed_at: DateTime<Utc>,
    ) -> Result<(), ContentRepositoryError> {
        if self.read()?.contains_key(&content_id) {
            self.index_failures()?.insert(content_id, failed_at);
        }
        Ok(())
    }

    async fn list_pending_index(
        &self,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let mut contents: Vec<ContentItem> = self
            .read()?
            .values()
            .filter(|content| content.index_status == IndexStatus::Pending)
            .cloned()
            .collect();

        // `None` sorts first: contents that never failed
        let index_failures = self.index_failures()?;
        contents.sort_by_key(|content| {
            (
                index_failures.get(&content.id).copied(),
                content.created_at,
                content.id,
            )
        });

        contents.truncate(limit);
        Ok(contents)
    }
}
