//! Mapping of failures to the two public error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, info};

use crate::gateway::GatewayError;

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

/// Application error type.
///
/// Clients only ever see "Not found" or "Internal error"; the detail is logged
/// together with the request path.
#[derive(Debug)]
pub enum AppError {
    NotFound { path: String, message: String },
    Internal { path: String, message: String },
}

impl AppError {
    /// Classify a gateway failure for the request at `path`.
    pub fn from_gateway(path: &str, err: GatewayError) -> Self {
        let path = path.to_string();
        match err {
            GatewayError::UnknownStation(_) => AppError::NotFound {
                path,
                message: err.to_string(),
            },
            GatewayError::Upstream(_) | GatewayError::Cache(_) => AppError::Internal {
                path,
                message: err.to_string(),
            },
        }
    }

    /// An internal failure outside the gateway, e.g. rendering.
    pub fn internal(path: &str, message: impl ToString) -> Self {
        AppError::Internal {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// No route matched `path`.
    pub fn no_route(path: &str) -> Self {
        AppError::NotFound {
            path: path.to_string(),
            message: "no such route".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::NotFound { path, message } => {
                info!(path = %path, "not found: {message}");
                (StatusCode::NOT_FOUND, "Not found")
            }
            AppError::Internal { path, message } => {
                error!(path = %path, "internal error: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
