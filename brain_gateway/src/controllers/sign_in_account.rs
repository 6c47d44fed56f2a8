use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use serde_json::json;

use super::json_error_response;
use crate::repositories::authentication_jwt_repository::{
    AuthenticationJwtRepository, AuthenticationJwtRepositoryError,
};

/// Sign-in controller: exchanges an id token for the verified user id
#[tracing::instrument(name = "Sign in user account", skip(auth_repository, body))]
pub async fn sign_in_account(
    auth_repository: web::Data<AuthenticationJwtRepository>,
    body: web::Json<SignInAccountBodyData>,
) -> Result<HttpResponse, SignInAccountError> {
    let uid = auth_repository.decode_token(&body.id_token)?;

    Ok(HttpResponse::Ok().json(json!({ "uid": uid })))
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInAccountBodyData {
    pub id_token: String,
}

#[derive(thiserror::Error)]
pub enum SignInAccountError {
    #[error("Invalid token")]
    InvalidToken(#[from] AuthenticationJwtRepositoryError),
}

impl std::fmt::Debug for SignInAccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SignInAccountError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        json_error_response(self.status_code(), &self.to_string())
    }
}
