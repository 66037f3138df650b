use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{store::StoreError, upload::UploadError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Blog not found")]
    BlogNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Storage failure")]
    Store(#[from] StoreError),

    #[error("Upload failure")]
    Upload(#[from] UploadError),

    #[error("Password reset is not implemented")]
    NotImplemented,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::DuplicateUsername | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::BlogNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Store(source) => {
                error!("Storage failure: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upload(source) => {
                error!("Upload failure: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
