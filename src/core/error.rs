//! Error types and handling for the leaderboard service
//!
//! The ranked store itself never fails: unknown names surface as `None` or
//! `false`. These errors cover the layers around it (configuration, HTTP,
//! metrics export).

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the leaderboard service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create an already exists error
    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists(resource.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::NotFound(_) | Error::AlreadyExists(_)
        )
    }

    /// Check if this is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::NotFound(_) => 404,
            Error::AlreadyExists(_) => 409,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(Error::not_found("dave").is_client_error());
        assert!(Error::already_exists("alice").is_client_error());
        assert!(Error::invalid_input("limit").is_client_error());
        assert!(Error::internal("boom").is_server_error());
        assert!(Error::config("bad").is_server_error());
    }

    #[test]
    fn maps_status_codes() {
        assert_eq!(Error::invalid_input("q").status_code(), 400);
        assert_eq!(Error::not_found("dave").status_code(), 404);
        assert_eq!(Error::already_exists("alice").status_code(), 409);
        assert_eq!(Error::internal("boom").status_code(), 500);
    }

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            Error::not_found("user dave").to_string(),
            "Resource not found: user dave"
        );
    }
}
