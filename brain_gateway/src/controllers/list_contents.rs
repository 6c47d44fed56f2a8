use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use common::helper::error_chain_fmt;
use serde_json::json;
use tracing::error;

use super::{json_error_response, INTERNAL_ERROR_MESSAGE};
use crate::{
    domain::use_cases::list_contents::{ListContentsError, ListContentsUseCase},
    middlewares::jwt_authentication::UserIdFromToken,
};

#[tracing::instrument(name = "List contents", skip(list_contents), fields(owner_id = %user_id.0))]
pub async fn list_contents(
    list_contents: web::Data<ListContentsUseCase>,
    user_id: web::ReqData<UserIdFromToken>,
) -> Result<HttpResponse, ListContentsControllerError> {
    let contents = list_contents.execute(user_id.into_inner().0).await?;

    Ok(HttpResponse::Ok().json(json!({ "contents": contents })))
}

#[derive(thiserror::Error)]
pub enum ListContentsControllerError {
    #[error(transparent)]
    ListContentsError(#[from] ListContentsError),
}

impl std::fmt::Debug for ListContentsControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ListContentsControllerError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        error!(error = ?self, "Failed to list contents");
        json_error_response(self.status_code(), INTERNAL_ERROR_MESSAGE)
    }
}
