use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::database::StoreError;
use crate::models::ErrorResponse;

/// Request-level failure, rendered as `{"err": ...}`.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Duplicate(String),
    BadRequest(String),
    Store(StoreError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::Duplicate(msg) => write!(f, "{}", msg),
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            err: self.to_string(),
        })
    }
}

/// Logs a store failure at the handler boundary and converts it.
pub fn store_failure(context: &'static str) -> impl Fn(StoreError) -> AppError {
    move |e| {
        log::error!("❌ {}: {}", context, e);
        AppError::Store(e)
    }
}
