//! API Client Error Types
//!
//! Transport-level failures of the admin REST API. Application-level
//! failures (`success: false`) are not errors at this layer: they come back
//! as an [`Envelope`](super::dto::Envelope) and the dashboard decides what to
//! show.

use thiserror::Error;

/// Errors that can occur when talking to the admin backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection refused, DNS failure, TLS error...
    #[error("Admin API unavailable: {0}")]
    Unavailable(String),

    /// The request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Any other reqwest failure
    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    /// Body was not the JSON shape we expected
    #[error("Invalid response body from {path}: {message}")]
    Decode { path: String, message: String },

    /// Base URL or path could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-JSON endpoint (backup download) answered with an error status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Unavailable(err.to_string())
        } else {
            ClientError::Request(err)
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Decode {
            path: "/api/users".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid response body from /api/users: expected value"
        );

        let err = ClientError::Status {
            status: 404,
            message: "Sahifa topilmadi".to_string(),
        };
        assert_eq!(err.to_string(), "API error 404: Sahifa topilmadi");
    }
}
