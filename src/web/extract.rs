// src/web/extract.rs
use crate::error::AppError;
use axum::extract::{rejection::QueryRejection, FromRequest, FromRequestParts};

/// `axum::Json` whose rejections become `AppError::InvalidInput` (400 with a
/// JSON body) instead of axum's plain-text 4xx responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Same as [`AppJson`] for query strings.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}
