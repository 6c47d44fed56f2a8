use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use tracing::error;
use uuid::Uuid;

use super::{json_error_response, INTERNAL_ERROR_MESSAGE};
use crate::{
    domain::use_cases::delete_content::{DeleteContentError, DeleteContentUseCase},
    middlewares::jwt_authentication::UserIdFromToken,
};

#[tracing::instrument(name = "Delete content", skip(delete_content), fields(owner_id = %user_id.0))]
pub async fn delete_content(
    delete_content: web::Data<DeleteContentUseCase>,
    user_id: web::ReqData<UserIdFromToken>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DeleteContentControllerError> {
    delete_content
        .execute(user_id.into_inner().0, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[derive(thiserror::Error)]
pub enum DeleteContentControllerError {
    #[error(transparent)]
    DeleteContentError(#[from] DeleteContentError),
}

impl std::fmt::Debug for DeleteContentControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for DeleteContentControllerError {
    fn status_code(&self) -> StatusCode {
        match self {
            DeleteContentControllerError::DeleteContentError(DeleteContentError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            DeleteContentControllerError::DeleteContentError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self.status_code() {
            StatusCode::NOT_FOUND => json_error_response(StatusCode::NOT_FOUND, &self.to_string()),
            status => {
                error!(error = ?self, "Failed to delete content");
                json_error_response(status, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
