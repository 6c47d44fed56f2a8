use async_trait::async_trait;
use secrecy::Secret;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    domain::entities::user::{CheckingUser, CreatingUser},
    ports::user_repository::{UserRepository, UserRepositoryError},
};

/// Postgres error code of a unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";

/// User repository implemented using Postgres
pub struct UserPostgresRepository {
    pool: PgPool,
}

impl UserPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[derive(FromRow)]
struct CheckingUserRecord {
    id: Uuid,
    password_hash: String,
}

#[async_trait]
impl UserRepository for UserPostgresRepository {
    #[tracing::instrument(name = "Saving new user in database", skip(self, user), fields(user_id = %user.id))]
    async fn add_user(&self, user: &CreatingUser) -> Result<(), UserRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_ref())
        .bind(&user.display_name)
        .bind(user.password_hash.as_ref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                UserRepositoryError::EmailAlreadyUsed(user.email.as_ref().to_string())
            } else {
                UserRepositoryError::DBError(error)
            }
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Checking user in database", skip(self))]
    async fn check_user(&self, email: &str) -> Result<CheckingUser, UserRepositoryError> {
        let record = sqlx::query_as::<_, CheckingUserRecord>(
            r#"
    SELECT id, password_hash FROM users
    WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| UserRepositoryError::UserDoesNotExist(email.to_string()))?;

        Ok(CheckingUser {
            id: record.id,
            password_hash: Secret::new(record.password_hash),
        })
    }
}
