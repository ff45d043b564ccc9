//! Upstream client error types.

use std::fmt;

use super::projection::ProjectionError;

/// Errors from fetching a record from the upstream service.
#[derive(Debug)]
pub enum UpstreamError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Response body was not valid JSON
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response was JSON but not of the expected shape
    Projection(ProjectionError),

    /// Upstream returned an error status code
    ApiError { status: u16, message: String },

    /// Service details not found (expired or invalid ID)
    ServiceNotFound,

    /// Invalid access token or unauthorized
    Unauthorized,

    /// Client could not be set up
    NotConfigured(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Http(e) => write!(f, "HTTP error: {e}"),
            UpstreamError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            UpstreamError::Projection(e) => write!(f, "malformed record: {e}"),
            UpstreamError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            UpstreamError::ServiceNotFound => {
                write!(f, "service not found (expired or invalid ID)")
            }
            UpstreamError::Unauthorized => write!(f, "unauthorized (invalid access token)"),
            UpstreamError::NotConfigured(msg) => write!(f, "not configured: {msg}"),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Http(e) => Some(e),
            UpstreamError::Projection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Http(err)
    }
}

impl From<ProjectionError> for UpstreamError {
    fn from(err: ProjectionError) -> Self {
        UpstreamError::Projection(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = UpstreamError::ServiceNotFound;
        assert_eq!(err.to_string(), "service not found (expired or invalid ID)");

        let err = UpstreamError::ApiError {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = UpstreamError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));

        let err = UpstreamError::from(ProjectionError::MissingField {
            path: "previousCallingPoints[0].callingPoint".into(),
        });
        assert_eq!(
            err.to_string(),
            "malformed record: missing required field at previousCallingPoints[0].callingPoint"
        );
    }
}
