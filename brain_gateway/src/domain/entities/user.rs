use chrono::{DateTime, Utc};
use common::{helper::error_chain_fmt, telemetry::spawn_blocking_with_tracing};
use secrecy::Secret;
use tracing::info;
use uuid::Uuid;

use super::{
    user_email::{UserEmail, UserEmailError},
    user_password::{UserPassword, UserPasswordError},
};

pub const DISPLAY_NAME_MAX_LENGTH: usize = 128;

/// Represents a user.
///
/// The user entity is used in different contexts:
/// while creating it, when checking if the user exists etc.
///
/// The password hash is wrapped in a `Secret` to avoid leaks in logs.
#[derive(Debug, Clone)]
pub enum User {
    Creating(CreatingUser),
    Checking(CheckingUser),
}

#[derive(Debug, Clone)]
pub struct CreatingUser {
    pub id: Uuid,
    pub email: UserEmail,
    pub display_name: Option<String>,
    pub password_hash: UserPassword,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CheckingUser {
    pub id: Uuid,
    pub password_hash: Secret<String>,
}

impl User {
    /// Creates a user, generating their hashed password
    ///
    /// Hashing is CPU-intensive: it runs on the blocking thread pool.
    pub async fn create(
        email: &str,
        password: Secret<String>,
        display_name: Option<&str>,
    ) -> Result<CreatingUser, UserError> {
        let email = UserEmail::parse(email)?;
        info!(email = email.as_ref(), "Valid email");

        let display_name = parse_display_name(display_name)?;

        let password_hash =
            spawn_blocking_with_tracing(move || UserPassword::compute_password_hash(password))
                .await
                .map_err(|e| {
                    UserError::InternalError(format!(
                        "Unexpected error when spawning blocking thread: {}",
                        e
                    ))
                })??;

        let now = Utc::now();

        Ok(CreatingUser {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }
}

fn parse_display_name(display_name: Option<&str>) -> Result<Option<String>, UserError> {
    let display_name = match display_name.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(display_name) => display_name,
    };

    if display_name.chars().count() > DISPLAY_NAME_MAX_LENGTH {
        return Err(UserError::InvalidDisplayName(format!(
            "Display name must not exceed {} characters",
            DISPLAY_NAME_MAX_LENGTH
        )));
    }

    Ok(Some(display_name.to_string()))
}

impl CheckingUser {
    /// Verifies a password candidate against the stored hash, on the blocking thread pool
    pub async fn verify_password_hash(&self, password: Secret<String>) -> Result<(), UserError> {
        let password_hash = UserPassword::parse(self.password_hash.clone())?;

        spawn_blocking_with_tracing(move || password_hash.verify(password))
            .await
            .map_err(|e| {
                UserError::InternalError(format!(
                    "Unexpected error when spawning blocking thread: {}",
                    e
                ))
            })??;

        Ok(())
    }
}

#[derive(thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    PasswordError(#[from] UserPasswordError),
    #[error(transparent)]
    EmailError(#[from] UserEmailError),
    #[error("{0}")]
    InvalidDisplayName(String),
    #[error("Internal: {0}")]
    InternalError(String),
}

impl std::fmt::Debug for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
