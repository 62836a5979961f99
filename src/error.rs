use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{
    auth::{PasswordError, TokenError},
    users::{repo::RepoError, validation::ValidationError},
};

/// Every failure a handler can produce, mapped onto one HTTP response each.
///
/// Variants carrying a `String` keep the internal detail for logging only;
/// the response body never includes it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Parse(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("no user with that email")]
    NotFound,
    #[error("password mismatch")]
    Credentials,
    #[error("persist user: {0}")]
    Persistence(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("hash password: {0}")]
    Hashing(String),
    #[error("issue token: {0}")]
    TokenEncoding(String),
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("deadline exceeded")]
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Parse(_)
            | ApiError::Validation(_)
            | ApiError::DuplicateEmail
            | ApiError::NotFound
            | ApiError::Persistence(_)
            | ApiError::Hashing(_)
            | ApiError::TokenEncoding(_) => StatusCode::BAD_REQUEST,
            ApiError::Credentials => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::DuplicateEmail => failed("User already registered, please login"),
            ApiError::NotFound => failed("Login failed, please signup"),
            ApiError::Credentials => failed("Login failed, please try again"),
            ApiError::Parse(msg) => json!({ "error": format!("Invalid request: {msg}") }),
            ApiError::Validation(e) => json!({ "error": e.to_string() }),
            ApiError::Unauthorized(msg) => json!({ "error": msg }),
            ApiError::Persistence(_) => json!({ "error": "Could not save user" }),
            ApiError::Hashing(_) => json!({ "error": "Could not process password" }),
            ApiError::TokenEncoding(_) => json!({ "error": "Could not issue token" }),
            ApiError::Storage(_) => json!({ "error": "Internal server error" }),
            ApiError::Timeout => json!({ "error": "Request timed out" }),
        };
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        }
        (status, Json(body)).into_response()
    }
}

fn failed(message: &str) -> serde_json::Value {
    json!({ "status": "failed", "message": message })
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateEmail => ApiError::DuplicateEmail,
            RepoError::Storage(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Mismatch => ApiError::Credentials,
            PasswordError::Hash(msg) => ApiError::Hashing(msg),
            PasswordError::MalformedHash(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        ApiError::TokenEncoding(e.to_string())
    }
}
