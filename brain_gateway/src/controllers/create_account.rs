use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use secrecy::Secret;
use serde_json::json;
use tracing::{error, info};

use super::{json_error_response, INTERNAL_ERROR_MESSAGE};
use crate::{
    domain::entities::{
        user::{User, UserError},
        user_password::UserPasswordError,
    },
    ports::user_repository::{UserRepository, UserRepositoryError},
};

/// Sign-up controller
///
/// Errors are answered with fixed messages, never with the underlying error.
#[tracing::instrument(name = "Create user account", skip(user_repository, body))]
pub async fn create_account(
    user_repository: web::Data<dyn UserRepository>,
    body: web::Json<CreateAccountBodyData>,
) -> Result<HttpResponse, CreateAccountError> {
    let CreateAccountBodyData {
        email,
        password,
        display_name,
    } = body.into_inner();

    let user = User::create(&email, Secret::new(password), display_name.as_deref())
        .await
        .map_err(|error| match error {
            UserError::EmailError(_) => CreateAccountError::InvalidEmail,
            UserError::PasswordError(UserPasswordError::InvalidLength) => {
                CreateAccountError::InvalidPassword
            }
            UserError::InvalidDisplayName(_) => CreateAccountError::InvalidDisplayName,
            _ => CreateAccountError::UserInternalError(error),
        })?;

    user_repository
        .add_user(&user)
        .await
        .map_err(|error| match error {
            UserRepositoryError::EmailAlreadyUsed(_) => CreateAccountError::EmailAlreadyUsed,
            _ => CreateAccountError::RepositoryInternalError(error),
        })?;

    info!(user_id = %user.id, "Successfully created user");
    Ok(HttpResponse::Created().json(json!({ "uid": user.id })))
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountBodyData {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(thiserror::Error)]
pub enum CreateAccountError {
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Invalid display name")]
    InvalidDisplayName,
    #[error("Could not create the account with this email")]
    EmailAlreadyUsed,
    #[error(transparent)]
    UserInternalError(UserError),
    #[error(transparent)]
    RepositoryInternalError(UserRepositoryError),
}

impl std::fmt::Debug for CreateAccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreateAccountError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreateAccountError::InvalidEmail
            | CreateAccountError::InvalidPassword
            | CreateAccountError::InvalidDisplayName
            | CreateAccountError::EmailAlreadyUsed => StatusCode::BAD_REQUEST,
            CreateAccountError::UserInternalError(_)
            | CreateAccountError::RepositoryInternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from create_account controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = ?self, "Failed to create account");
                json_error_response(self.status_code(), INTERNAL_ERROR_MESSAGE)
            }
            status => json_error_response(status, &self.to_string()),
        }
    }
}
