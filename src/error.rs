//! Application-level error type.
//!
//! Aggregates API, configuration, and IO errors and turns them into
//! messages fit for a terminal.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::context::ContextError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl From<ContextError> for AppError {
    fn from(err: ContextError) -> Self {
        AppError::Api(ApiError::Context(err))
    }
}

impl AppError {
    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Set JIRAKIT_CONFIG to a file path."
                        .to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file exists and is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
                other => other.to_string(),
            },
            AppError::Api(e) => match e {
                ApiError::InvalidInput(msg) => msg.clone(),
                ApiError::Unauthorized => {
                    "Authentication failed. Please check your email and API token.".to_string()
                }
                ApiError::Forbidden => {
                    "Access denied. You don't have permission to access this resource.".to_string()
                }
                ApiError::NotFound(resource) => format!("'{}' was not found.", resource),
                ApiError::BadRequest(msg) => format!("JIRA rejected the request: {}", msg),
                ApiError::RateLimited => {
                    "Too many requests. Please wait a moment and try again.".to_string()
                }
                ApiError::Network(_) => {
                    "Connection failed. Please check your internet connection.".to_string()
                }
                ApiError::Keyring(_) => format!(
                    "No API token available. Store one in the keyring or set {}.",
                    crate::api::TOKEN_ENV_VAR
                ),
                ApiError::Context(ContextError::Cancelled) => "Cancelled.".to_string(),
                ApiError::Context(ContextError::DeadlineExceeded) => {
                    "Gave up waiting: the timeout elapsed.".to_string()
                }
                other => other.to_string(),
            },
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Timeouts and cancellations are distinguished from hard failures so
    /// scripts can tell "still running" apart from "broken".
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Api(ApiError::Context(ContextError::DeadlineExceeded)) => 124,
            AppError::Api(ApiError::Context(ContextError::Cancelled)) => 130,
            AppError::Config(_) | AppError::Api(ApiError::InvalidInput(_)) => 2,
            _ => 1,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
