pub mod create_account;
pub mod create_content;
pub mod delete_content;
pub mod health_check;
pub mod list_contents;
pub mod log_in_account;
pub mod reindex_content;
pub mod search_content;
pub mod sign_in_account;

pub use create_account::*;
pub use create_content::*;
pub use delete_content::*;
pub use health_check::*;
pub use list_contents::*;
pub use log_in_account::*;
pub use reindex_content::*;
pub use search_content::*;
pub use sign_in_account::*;

use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

/// Message of every 500 response: internal details are only logged
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong, please try again later";

/// JSON `{"error": message}` response
pub fn json_error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}
