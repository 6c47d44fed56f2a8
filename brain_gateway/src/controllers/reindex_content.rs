use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use tracing::error;
use uuid::Uuid;

use super::{json_error_response, INTERNAL_ERROR_MESSAGE};
use crate::{
    domain::use_cases::reindex_content::{ReindexContentError, ReindexContentUseCase},
    middlewares::jwt_authentication::UserIdFromToken,
};

/// Retries the vector index write of a content, typically after a failed creation
#[tracing::instrument(name = "Reindex content", skip(reindex_content), fields(owner_id = %user_id.0))]
pub async fn reindex_content(
    reindex_content: web::Data<ReindexContentUseCase>,
    user_id: web::ReqData<UserIdFromToken>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReindexContentControllerError> {
    let content = reindex_content
        .execute(user_id.into_inner().0, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(content))
}

#[derive(thiserror::Error)]
pub enum ReindexContentControllerError {
    #[error(transparent)]
    ReindexContentError(#[from] ReindexContentError),
}

impl std::fmt::Debug for ReindexContentControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ReindexContentControllerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReindexContentControllerError::ReindexContentError(ReindexContentError::NotFound(
                _,
            )) => StatusCode::NOT_FOUND,
            ReindexContentControllerError::ReindexContentError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self.status_code() {
            StatusCode::NOT_FOUND => json_error_response(StatusCode::NOT_FOUND, &self.to_string()),
            status => {
                error!(error = ?self, "Failed to reindex content");
                json_error_response(status, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
