//! Error types for API operations.

use serde::Deserialize;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level HTTP failure (connection refused, TLS, decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the server's `error` field, if any.
        message: Option<String>,
    },

    /// The call requires a bearer token and none is set.
    #[error("Not logged in")]
    Unauthenticated,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns the message supplied by the server, if the server sent one.
    ///
    /// Transport failures never carry a server message.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the server rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::Api { status: 401 | 403, .. }
        )
    }
}

/// Error body returned by the API on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error.
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Converts to an Error for the given status.
    #[must_use]
    pub fn into_error(self, status: u16) -> Error {
        Error::Api {
            status,
            message: self.error.filter(|m| !m.trim().is_empty()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn server_message_only_for_api_errors() {
        let err = Error::Api {
            status: 500,
            message: Some("SMTP auth failed".to_string()),
        };
        assert_eq!(err.server_message(), Some("SMTP auth failed"));
        assert_eq!(Error::Unauthenticated.server_message(), None);
        assert_eq!(
            Error::InvalidConfig("x".to_string()).server_message(),
            None
        );
    }

    #[test]
    fn blank_server_message_is_dropped() {
        let body: ErrorResponse = serde_json::from_str(r#"{"error":"  "}"#).unwrap();
        assert_eq!(body.into_error(400).server_message(), None);
    }

    #[test]
    fn missing_error_field() {
        let body: ErrorResponse = serde_json::from_str("{}").unwrap();
        let err = body.into_error(502);
        assert!(matches!(err, Error::Api { status: 502, message: None }));
        assert_eq!(err.to_string(), "API error (502): no details");
    }

    #[test]
    fn unauthorized_statuses() {
        assert!(Error::Unauthenticated.is_unauthorized());
        assert!(Error::Api { status: 401, message: None }.is_unauthorized());
        assert!(!Error::Api { status: 500, message: None }.is_unauthorized());
    }
}
