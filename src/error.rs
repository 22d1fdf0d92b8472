//! Error types for the Glasnostic console client

use thiserror::Error;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Glasnostic console client
///
/// The client performs no retries and no recovery: every failure from the
/// remote service propagates immediately to the caller, carrying enough
/// context to identify the failing operation and key.
#[derive(Error, Debug)]
pub enum Error {
    /// Authentication error (bad credentials, missing session, malformed
    /// login response)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Commit rejected because the presented commit id is stale
    #[error("Commit conflict: {0}")]
    Conflict(String),

    /// Malformed or missing input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Unexpected response from the service
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_auth() {
        let err = Error::Auth("wrong password".to_string());
        assert_eq!(err.to_string(), "Authentication error: wrong password");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("view abc123".to_string());
        assert_eq!(err.to_string(), "Not found: view abc123");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("commit view: stale commit id".to_string());
        assert_eq!(
            err.to_string(),
            "Commit conflict: commit view: stale commit id"
        );
    }

    #[test]
    fn test_error_display_api() {
        let err = Error::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 502): bad gateway");
    }

    #[test]
    fn test_error_from_json() {
        let json_str = "{ invalid json }}}";
        let json_err = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("TOML parse error: expected value".to_string());
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
