//! Error types for moneyweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use moneyweb_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error")]
    InternalError,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(CoreError::TransactionNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(error) => {
                DefaultErrorLogger.log_error(error, &ErrorContext::new("request"));
                serde_json::json!({ "success": false, "error": error.to_details() })
            }
            other => {
                log::warn!("{}", other);
                serde_json::json!({ "success": false, "message": other.to_string() })
            }
        };
        (status, axum::Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
