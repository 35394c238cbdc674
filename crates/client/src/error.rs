//! Unified error type for backend calls.
//!
//! Every feature module surfaces failures as an [`ApiError`] carrying a
//! human-readable message. Errors are never swallowed: the embedding UI
//! decides how to display them and leaves its own state unchanged.

use thiserror::Error;

/// Errors that can occur when calling the AgriChain backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured deadline. The
    /// in-flight request was aborted; no retry was attempted.
    #[error("request timed out after {ms} ms")]
    Timeout {
        /// Deadline that elapsed, in milliseconds.
        ms: u64,
    },

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response body's `message`/`error` field, or the
        /// HTTP status line when the body was not parseable.
        message: String,
    },

    /// A 2xx response carried a non-JSON content type the caller did not
    /// allow.
    #[error("unexpected content type: {0}")]
    ContentType(String),

    /// A 2xx response body could not be parsed as the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Status code of an API-level error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for timeout and transport failures where the backend was never
    /// (or not provably) reached.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }

    /// Message suitable for direct display: connectivity problems collapse
    /// to a generic hint, backend messages pass through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_connectivity() {
            "Could not reach the server. Check your connection and try again.".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Result alias used throughout the client.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_backend_message() {
        let err = ApiError::Api {
            status: 409,
            message: "out of stock".to_string(),
        };
        assert_eq!(err.to_string(), "out of stock");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_timeout_is_connectivity() {
        let err = ApiError::Timeout { ms: 10_000 };
        assert!(err.is_connectivity());
        assert!(err.user_message().contains("connection"));
    }

    #[test]
    fn test_api_error_is_not_connectivity() {
        let err = ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_connectivity());
        assert_eq!(err.user_message(), "boom");
    }
}
