use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use serde_json::json;
use tracing::error;

use super::{json_error_response, INTERNAL_ERROR_MESSAGE};
use crate::{
    domain::use_cases::search_content::{SearchContentError, SearchContentUseCase},
    middlewares::jwt_authentication::UserIdFromToken,
};

#[tracing::instrument(name = "Search content handler", skip(search_content, body), fields(owner_id = %user_id.0))]
pub async fn search_content(
    search_content: web::Data<SearchContentUseCase>,
    user_id: web::ReqData<UserIdFromToken>,
    body: web::Json<SearchContentBodyData>,
) -> Result<HttpResponse, SearchContentControllerError> {
    let query = body.into_inner().q.unwrap_or_default();

    let results = search_content
        .execute(user_id.into_inner().0, &query)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "results": results })))
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct SearchContentBodyData {
    pub q: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SearchContentControllerError {
    #[error(transparent)]
    SearchContentError(#[from] SearchContentError),
}

impl std::fmt::Debug for SearchContentControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SearchContentControllerError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchContentControllerError::SearchContentError(
                SearchContentError::ValidationError(_),
            ) => StatusCode::BAD_REQUEST,
            SearchContentControllerError::SearchContentError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from search_content controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self.status_code() {
            StatusCode::BAD_REQUEST => {
                json_error_response(StatusCode::BAD_REQUEST, &self.to_string())
            }
            status => {
                error!(error = ?self, "Failed to search contents");
                json_error_response(status, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
