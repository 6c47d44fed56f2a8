use chrono::{Duration, Utc};
use common::helper::error_chain_fmt;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Repository to handle JWT access tokens
///
/// Used by the authentication middleware, the sign-in and the log-in controllers.
#[derive(Clone)]
pub struct AuthenticationJwtRepository {
    secret: Secret<String>,
    expire_in_s: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id
    pub sub: String,

    /// Issued At
    pub iat: usize,

    /// Expires At
    pub exp: usize,
}

impl AuthenticationJwtRepository {
    pub fn new(secret: Secret<String>, expire_in_s: i64) -> Self {
        Self {
            secret,
            expire_in_s,
        }
    }

    /// Creates a new access token for the given user
    #[tracing::instrument(name = "Create JWT token", skip(self))]
    pub fn create_token(&self, user_id: Uuid) -> Result<String, AuthenticationJwtRepositoryError> {
        if user_id.is_nil() {
            return Err(AuthenticationJwtRepositoryError::InvalidData(
                "Missing user id".to_string(),
            ));
        }

        let now = Utc::now();
        let iat = now.timestamp().max(0) as usize;
        let exp = (now + Duration::seconds(self.expire_in_s)).timestamp().max(0) as usize;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp,
            iat,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(AuthenticationJwtRepositoryError::EncodingError)
    }

    /// Decodes an access token into the id of its user
    ///
    /// The signature and the expiration are both checked.
    #[tracing::instrument(name = "Decode JWT token", skip(self, token))]
    pub fn decode_token(&self, token: &str) -> Result<Uuid, AuthenticationJwtRepositoryError> {
        let token = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(AuthenticationJwtRepositoryError::DecodingError)?;

        Uuid::parse_str(&token.claims.sub).map_err(|_| {
            AuthenticationJwtRepositoryError::InvalidData(format!(
                "Subject is not a user id: {}",
                token.claims.sub
            ))
        })
    }
}

#[derive(thiserror::Error)]
pub enum AuthenticationJwtRepositoryError {
    #[error("Invalid JWT token while decoding: {0}")]
    DecodingError(jsonwebtoken::errors::Error),
    #[error("Error while encoding JWT token: {0}")]
    EncodingError(jsonwebtoken::errors::Error),
    #[error("Invalid JWT token data: {0}")]
    InvalidData(String),
}

impl std::fmt::Debug for AuthenticationJwtRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
