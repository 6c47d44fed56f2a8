use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    domain::entities::content::{ContentItem, ContentType, IndexStatus},
    ports::content_repository::{ContentRepository, ContentRepositoryError},
};

/// Content repository implemented using Postgres
pub struct ContentPostgresRepository {
    pool: PgPool,
}

impl ContentPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ContentRecord {
    id: Uuid,
    owner_id: Uuid,
    content_type: String,
    title: String,
    body: String,
    link: Option<String>,
    tags: Vec<String>,
    index_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRecord> for ContentItem {
    type Error = ContentRepositoryError;

    fn try_from(record: ContentRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let corrupted = move |message: String| ContentRepositoryError::CorruptedRecord { id, message };

        let content_type = ContentType::from_str(&record.content_type).map_err(corrupted)?;
        let index_status = IndexStatus::from_str(&record.index_status).map_err(corrupted)?;

        Ok(ContentItem {
            id: record.id,
            owner_id: record.owner_id,
            content_type,
            title: record.title,
            body: record.body,
            link: record.link,
            tags: record.tags,
            index_status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

const SELECT_CONTENTS: &str = r#"
    SELECT id, owner_id, content_type, title, body, link, tags, index_status, created_at, updated_at
    FROM contents
"#;

fn into_contents(records: Vec<ContentRecord>) -> Result<Vec<ContentItem>, ContentRepositoryError> {
    records.into_iter().map(ContentItem::try_from).collect()
}

#[async_trait]
impl ContentRepository for ContentPostgresRepository {
    #[tracing::instrument(name = "Saving content in database", skip(self, content), fields(content_id = %content.id))]
    async fn save(&self, content: &ContentItem) -> Result<(), ContentRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO contents (id, owner_id, content_type, title, body, link, tags, index_status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(content.id)
        .bind(content.owner_id)
        .bind(content.content_type.as_str())
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.link)
        .bind(&content.tags)
        .bind(content.index_status.as_str())
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Listing contents from database", skip(self))]
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let records = sqlx::query_as::<_, ContentRecord>(&format!(
            "{} WHERE owner_id = $1 ORDER BY created_at ASC, id ASC",
            SELECT_CONTENTS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        into_contents(records)
    }

    #[tracing::instrument(name = "Finding content in database", skip(self))]
    async fn find(
        &self,
        owner_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<ContentItem>, ContentRepositoryError> {
        sqlx::query_as::<_, ContentRecord>(&format!(
            "{} WHERE id = $1 AND owner_id = $2",
            SELECT_CONTENTS
        ))
        .bind(content_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .map(ContentItem::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "Deleting content from database", skip(self))]
    async fn delete(
        &self,
        owner_id: Uuid,
        content_id: Uuid,
    ) -> Result<bool, ContentRepositoryError> {
        let result = sqlx::query("DELETE FROM contents WHERE id = $1 AND owner_id = $2")
            .bind(content_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Updating content index status in database", skip(self))]
    async fn update_index_status(
        &self,
        content_id: Uuid,
        index_status: IndexStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ContentRepositoryError> {
        let result = sqlx::query("UPDATE contents SET index_status = $1, updated_at = $2 WHERE id = $3")
            .bind(index_status.as_str())
            .bind(updated_at)
            .bind(content_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Recording content index failure in database", skip(self))]
    async fn record_index_failure(
        &self,
        content_id: Uuid,
        failed_at: DateTime<Utc>,
    ) -> Result<(), ContentRepositoryError> {
        sqlx::query("UPDATE contents SET last_index_failure_at = $1 WHERE id = $2")
            .bind(failed_at)
            .bind(content_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Listing contents pending indexation from database", skip(self))]
    async fn list_pending_index(
        &self,
        limit: usize,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let records = sqlx::query_as::<_, ContentRecord>(&format!(
            "{} WHERE index_status = $1 \
             ORDER BY last_index_failure_at ASC NULLS FIRST, created_at ASC, id ASC LIMIT $2",
            SELECT_CONTENTS
        ))
        .bind(IndexStatus::Pending.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        into_contents(records)
    }
}
