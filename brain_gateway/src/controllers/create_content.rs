use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use serde_json::json;
use tracing::{error, info};

use super::{json_error_response, INTERNAL_ERROR_MESSAGE};
use crate::{
    domain::{
        entities::content::{ContentSubmission, IndexStatus},
        use_cases::ingest_content::{IngestContentError, IngestContentUseCase},
    },
    middlewares::jwt_authentication::UserIdFromToken,
};

#[tracing::instrument(name = "Create content", skip(ingest_content, body), fields(owner_id = %user_id.0))]
pub async fn create_content(
    ingest_content: web::Data<IngestContentUseCase>,
    user_id: web::ReqData<UserIdFromToken>,
    body: web::Json<CreateContentBodyData>,
) -> Result<HttpResponse, CreateContentError> {
    let UserIdFromToken(owner_id) = user_id.into_inner();

    let content = ingest_content
        .execute(owner_id, body.into_inner().into())
        .await?;

    Ok(HttpResponse::Created().json(content))
}

/// Every field is optional here, so that all the missing ones get reported at once
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct CreateContentBodyData {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<CreateContentBodyData> for ContentSubmission {
    fn from(body: CreateContentBodyData) -> Self {
        Self {
            content_type: body.content_type,
            title: body.title,
            body: body.content,
            link: body.link,
            tags: body.tags,
        }
    }
}

#[derive(thiserror::Error)]
pub enum CreateContentError {
    #[error(transparent)]
    IngestContentError(#[from] IngestContentError),
}

impl std::fmt::Debug for CreateContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CreateContentError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreateContentError::IngestContentError(IngestContentError::ValidationError(_)) => {
                StatusCode::BAD_REQUEST
            }
            CreateContentError::IngestContentError(IngestContentError::ContentDeleted(_)) => {
                StatusCode::CONFLICT
            }
            CreateContentError::IngestContentError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from create_content controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let CreateContentError::IngestContentError(error) = self;

        match error {
            IngestContentError::ValidationError(validation_error) => {
                HttpResponse::BadRequest().json(json!({
                    "error": validation_error.to_string(),
                    "invalidFields": validation_error.invalid_fields,
                }))
            }
            IngestContentError::IndexWriteError { content_id, .. } => {
                error!(error = ?self, "Content saved but not indexed");
                HttpResponse::InternalServerError().json(json!({
                    "error": "Content saved but not indexed yet",
                    "id": content_id,
                    "indexStatus": IndexStatus::Pending,
                }))
            }
            IngestContentError::ContentDeleted(_) => {
                info!(error = ?self, "Content deleted before its creation completed");
                json_error_response(StatusCode::CONFLICT, "Content was deleted while being created")
            }
            _ => {
                error!(error = ?self, "Failed to create content");
                json_error_response(self.status_code(), INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
