// src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    InvalidInput(String),

    /// The referenced teacher, session or result set does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to process password")]
    PasswordHashing,

    #[error("unexpected internal error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Config(_)
            | AppError::PasswordHashing
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Body rejections from axum::Json answer 400 like any other bad input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            AppError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_failures_surface_their_message() {
        let err = AppError::Database(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("database error:"));
    }
}
