use async_trait::async_trait;
use common::helper::error_chain_fmt;

use crate::domain::entities::user::{CheckingUser, CreatingUser};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn add_user(&self, user: &CreatingUser) -> Result<(), UserRepositoryError>;

    /// Gets what is needed to check the credentials of the user registered with `email`
    async fn check_user(&self, email: &str) -> Result<CheckingUser, UserRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum UserRepositoryError {
    #[error(transparent)]
    DBError(#[from] sqlx::Error),
    #[error("{0}")]
    UserDoesNotExist(String),
    #[error("Email already used: {0}")]
    EmailAlreadyUsed(String),
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

impl std::fmt::Debug for UserRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
