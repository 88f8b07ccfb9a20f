//! API error types for the JIRA client.

use thiserror::Error;

use crate::context::ContextError;

/// Errors that can occur when talking to the JIRA API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required argument was missing or out of range.
    ///
    /// Raised before any request is sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication failed - invalid email or API token.
    #[error("Authentication failed: check your email and API token")]
    Unauthorized,

    /// Permission denied - user lacks access to the resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limited by the JIRA API.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Conflict reported by the server.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The server rejected the request (e.g. malformed JQL).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// JIRA server error.
    #[error("JIRA server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// The response body could not be decoded.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The caller's context was cancelled or its deadline elapsed.
    #[error("{0}")]
    Context(#[from] ContextError),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an invalid-input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ApiError::InvalidInput(msg.into())
    }

    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            400 => ApiError::BadRequest(context.to_string()),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            409 => ApiError::Conflict(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Check whether the error is transient and a retry might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }

    /// Check whether the error came from the caller's context.
    pub fn is_context(&self) -> bool {
        matches!(self, ApiError::Context(_))
    }
}
