//! Conversion of domain errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use trendcast_core::AppError;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// An [`AppError`] bound to the status it is reported with.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: AppError,
}

impl ApiError {
    /// Report `error` as a 500 regardless of its kind.
    pub fn internal(error: AppError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let status = match &error {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(kind = self.error.kind(), error = %self.error, "Request failed");
        } else {
            tracing::debug!(kind = self.error.kind(), error = %self.error, "Request rejected");
        }

        let body = ErrorBody {
            error: self.error.to_string(),
            kind: self.error.kind(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
