// src/error.rs

//! Unified error handling for the storefront client.

use std::fmt;

use thiserror::Error;

/// Result type alias for storefront operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Upstream payload did not have the expected shape
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    /// Missing or expired bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cart operation rejected
    #[error("Cart error: {0}")]
    Cart(String),
}

impl AppError {
    /// Create a malformed-response error for an endpoint.
    pub fn malformed(endpoint: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Create a status error for an endpoint.
    pub fn status(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        Self::Cart(message.into())
    }

    /// Whether this error means the session must be dropped.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
            || matches!(self, Self::Status { status: 401, .. })
    }

    /// Short message suitable for a user-facing toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The request timed out. Please try again.".into(),
            Self::Http(_) => "Could not reach the bookshop. Check your connection.".into(),
            Self::Unauthorized(_) | Self::Status { status: 401, .. } => {
                "Your session has expired. Please log in again.".into()
            }
            Self::Status { status, .. } if *status >= 500 => {
                "The bookshop is having trouble right now.".into()
            }
            Self::MalformedResponse { .. } | Self::Json(_) => {
                "Received an unexpected response from the bookshop.".into()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_counts_as_unauthorized() {
        assert!(AppError::status("/orders/1", 401, "").is_unauthorized());
        assert!(AppError::unauthorized("no token").is_unauthorized());
        assert!(!AppError::status("/orders/1", 404, "").is_unauthorized());
    }

    #[test]
    fn malformed_display_names_endpoint() {
        let err = AppError::malformed("/listings", "missing listings array");
        assert_eq!(
            err.to_string(),
            "Malformed response from /listings: missing listings array"
        );
    }
}
