use async_trait::async_trait;
use secrecy::Secret;
use std::{collections::HashMap, sync::RwLock};

use crate::{
    domain::entities::user::{CheckingUser, CreatingUser},
    ports::user_repository::{UserRepository, UserRepositoryError},
};

/// User repository kept in the process memory, keyed by email
#[derive(Default)]
pub struct UserInMemoryRepository {
    users: RwLock<HashMap<String, CheckingUser>>,
}

impl UserInMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for UserInMemoryRepository {
    #[tracing::instrument(name = "Saving new user in memory", skip(self, user), fields(user_id = %user.id))]
    async fn add_user(&self, user: &CreatingUser) -> Result<(), UserRepositoryError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| UserRepositoryError::Unavailable(e.to_string()))?;

        let email = user.email.as_ref().to_string();
        if users.contains_key(&email) {
            return Err(UserRepositoryError::EmailAlreadyUsed(email));
        }

        users.insert(
            email,
            CheckingUser {
                id: user.id,
                password_hash: Secret::new(user.password_hash.as_ref().to_string()),
            },
        );

        Ok(())
    }

    #[tracing::instrument(name = "Checking user in memory", skip(self))]
    async fn check_user(&self, email: &str) -> Result<CheckingUser, UserRepositoryError> {
        self.users
            .read()
            .map_err(|e| UserRepositoryError::Unavailable(e.to_string()))?
            .get(email)
            .cloned()
            .ok_or_else(|| UserRepositoryError::UserDoesNotExist(email.to_string()))
    }
}
