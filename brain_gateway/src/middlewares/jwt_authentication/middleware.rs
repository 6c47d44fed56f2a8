use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{self, StatusCode},
    web, HttpMessage, HttpResponse, ResponseError,
};
use common::helper::error_chain_fmt;
use futures::{future::LocalBoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tracing::info;
use uuid::Uuid;

use crate::repositories::authentication_jwt_repository::{
    AuthenticationJwtRepository, AuthenticationJwtRepositoryError,
};

/// Verified id of the user making the request, inserted in the request extensions
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct UserIdFromToken(pub Uuid);

/// Middleware responsible for handling authentication and user information extraction.
///
/// Requests without a valid bearer token are answered with a 401 without reaching
/// the wrapped service.
pub struct AuthMiddleware<S> {
    service: Rc<S>,
    auth_repository: web::Data<AuthenticationJwtRepository>,
}

impl<S> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>
        + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, actix_web::Error>>;

    /// Polls the readiness of the wrapped service.
    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    /// Handles incoming requests.
    fn call(&self, req: ServiceRequest) -> Self::Future {
        let user_id = bearer_token(&req).and_then(|token| {
            self.auth_repository
                .decode_token(token)
                .map_err(AuthenticationError::from)
        });

        let user_id = match user_id {
            Ok(user_id) => user_id,
            Err(error) => {
                info!(?error, "Rejected unauthenticated request");
                return Box::pin(ready(Ok(req.error_response(error))));
            }
        };

        let srv = Rc::clone(&self.service);

        // Inserts the user id into the request extensions and continues the request processing
        async move {
            req.extensions_mut()
                .insert::<UserIdFromToken>(UserIdFromToken(user_id));

            srv.call(req).await
        }
        .boxed_local()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
fn bearer_token(req: &ServiceRequest) -> Result<&str, AuthenticationError> {
    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthenticationError::MissingToken)?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthenticationError::MissingToken)
}

/// Middleware factory for requiring authentication.
pub struct RequireAuth {
    auth_repository: web::Data<AuthenticationJwtRepository>,
}

impl RequireAuth {
    pub fn new(auth_repository: web::Data<AuthenticationJwtRepository>) -> Self {
        Self { auth_repository }
    }
}

impl<S> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>
        + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    /// Creates and returns a new AuthMiddleware wrapped in a Result.
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddleware {
            service: Rc::new(service),
            auth_repository: self.auth_repository.clone(),
        }))
    }
}

#[derive(thiserror::Error)]
pub enum AuthenticationError {
    #[error("No access token was provided")]
    MissingToken,
    #[error("Invalid access token")]
    InvalidToken(#[from] AuthenticationJwtRepositoryError),
}

impl std::fmt::Debug for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
