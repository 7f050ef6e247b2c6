//! REST API error types
//!
//! These errors produce consistent JSON responses with appropriate HTTP
//! status codes.

use nf_stream::StreamError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_CHANNEL")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// API errors with associated HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    /// Bad request (400)
    #[error("Bad request: {code}: {message} {location}")]
    BadRequest {
        code: &'static str,
        message: String,
        location: ErrorLocation,
    },

    /// Service cannot take the request right now (503)
    #[error("Unavailable: {code}: {message} {location}")]
    Unavailable {
        code: &'static str,
        message: String,
        location: ErrorLocation,
    },

    /// Broker rejected or failed the operation (502)
    #[error("Broker failure: {message} {location}")]
    BadGateway {
        message: String,
        location: ErrorLocation,
    },

    /// Internal server error (500)
    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound { message, .. } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".into(),
                    message,
                },
            ),
            ApiError::BadRequest { code, message, .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: code.into(),
                    message,
                },
            ),
            ApiError::Unavailable { code, message, .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: code.into(),
                    message,
                },
            ),
            ApiError::BadGateway { message, .. } => {
                log::error!("Broker failure: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    ApiErrorBody {
                        code: "BROKER_UNAVAILABLE".into(),
                        message: "Broker unavailable".into(),
                    },
                )
            }
            ApiError::Internal { message, .. } => {
                log::error!("Internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "INTERNAL_ERROR".into(),
                        message,
                    },
                )
            }
        };

        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Convert stream errors to API errors
impl From<StreamError> for ApiError {
    #[track_caller]
    fn from(e: StreamError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let code = e.error_code();

        match e.status_code() {
            StatusCode::BAD_REQUEST => ApiError::BadRequest {
                code,
                message: e.to_string(),
                location,
            },
            StatusCode::NOT_FOUND => ApiError::NotFound {
                message: e.to_string(),
                location,
            },
            StatusCode::SERVICE_UNAVAILABLE => ApiError::Unavailable {
                code,
                message: e.to_string(),
                location,
            },
            StatusCode::BAD_GATEWAY => ApiError::BadGateway {
                message: e.to_string(),
                location,
            },
            _ => ApiError::Internal {
                message: e.to_string(),
                location,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
