//! HTTP error responses.
//!
//! Every non-2xx response carries `{ "error": message }`.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use directory::{DirectoryError, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::server::middleware::AuthUser;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ApiError::AdminRequired => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Directory(e) => match e {
                DirectoryError::Validation(_) => StatusCode::BAD_REQUEST,
                DirectoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                DirectoryError::Conflict { .. } => StatusCode::CONFLICT,
                DirectoryError::Offline => StatusCode::SERVICE_UNAVAILABLE,
                DirectoryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Any authenticated user.
pub fn require_user(auth: Option<Extension<AuthUser>>) -> Result<AuthUser, ApiError> {
    auth.map(|Extension(user)| user)
        .ok_or(ApiError::AuthenticationRequired)
}

/// An authenticated user with the admin flag.
pub fn require_admin(auth: Option<Extension<AuthUser>>) -> Result<AuthUser, ApiError> {
    let user = require_user(auth)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(ApiError::AdminRequired)
    }
}
