use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use secrecy::Secret;
use tracing::{error, info};
use uuid::Uuid;

use super::{json_error_response, INTERNAL_ERROR_MESSAGE};
use crate::{
    domain::entities::{user::UserError, user_password::UserPasswordError},
    ports::user_repository::{UserRepository, UserRepositoryError},
    repositories::authentication_jwt_repository::{
        AuthenticationJwtRepository, AuthenticationJwtRepositoryError,
    },
};

/// Log in user account controller
///
/// An unknown email and a wrong password get the same response.
#[tracing::instrument(
    name = "Log in user account",
    skip(user_repository, auth_repository, body)
)]
pub async fn log_in_account(
    user_repository: web::Data<dyn UserRepository>,
    auth_repository: web::Data<AuthenticationJwtRepository>,
    body: web::Json<LogInAccountBodyData>,
) -> Result<HttpResponse, LogInAccountError> {
    let LogInAccountBodyData { email, password } = body.into_inner();
    let email = email.trim().to_lowercase();
    let password = Secret::new(password);

    let stored_user = user_repository
        .check_user(&email)
        .await
        .map_err(|error| match error {
            UserRepositoryError::UserDoesNotExist(_) => {
                info!("Attempt to log in to a non-existing user");
                LogInAccountError::InvalidCredentials
            }
            _ => LogInAccountError::RepositoryInternalError(error),
        })?;

    stored_user
        .verify_password_hash(password)
        .await
        .map_err(|error| match error {
            UserError::PasswordError(UserPasswordError::InvalidCredentials(_)) => {
                info!(user_id = %stored_user.id, "Attempt to log in with a wrong password");
                LogInAccountError::InvalidCredentials
            }
            _ => LogInAccountError::UserInternalError(error),
        })?;

    let access_token = auth_repository.create_token(stored_user.id)?;

    info!(user_id = %stored_user.id, "Successfully logged in");
    Ok(HttpResponse::Ok().json(LogInAccountResponse {
        access_token,
        uid: stored_user.id,
    }))
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct LogInAccountBodyData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInAccountResponse {
    pub access_token: String,
    pub uid: Uuid,
}

#[derive(thiserror::Error)]
pub enum LogInAccountError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    RepositoryInternalError(UserRepositoryError),
    #[error(transparent)]
    UserInternalError(UserError),
    #[error(transparent)]
    AuthenticationJwtRepositoryError(#[from] AuthenticationJwtRepositoryError),
}

impl std::fmt::Debug for LogInAccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LogInAccountError {
    fn status_code(&self) -> StatusCode {
        match self {
            LogInAccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LogInAccountError::RepositoryInternalError(_)
            | LogInAccountError::UserInternalError(_)
            | LogInAccountError::AuthenticationJwtRepositoryError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from log_in_account controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            LogInAccountError::InvalidCredentials => {
                json_error_response(self.status_code(), &self.to_string())
            }
            _ => {
                error!(error = ?self, "Failed to log in");
                json_error_response(self.status_code(), INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
