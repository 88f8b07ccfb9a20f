//! Authentication handling for the JIRA API.
//!
//! JIRA Cloud uses Basic auth (email + API token); JIRA Data Center uses
//! Bearer personal access tokens. Tokens are resolved from the
//! `JIRAKIT_API_TOKEN` environment variable or the OS keyring and are never
//! written to the configuration file.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, Result};

/// The keyring service name for jirakit tokens.
const KEYRING_SERVICE: &str = "jirakit";

/// Environment variable that overrides the keyring lookup.
pub const TOKEN_ENV_VAR: &str = "JIRAKIT_API_TOKEN";

/// How credentials are presented to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// `Authorization: Basic base64(email:token)`.
    #[default]
    Basic,
    /// `Authorization: Bearer <token>`.
    Bearer,
}

/// Authentication credentials for JIRA.
#[derive(Debug, Clone)]
pub struct Auth {
    /// The user's email address (empty for bearer tokens).
    email: String,
    /// The complete authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create Basic auth credentials from email and token.
    ///
    /// The token is immediately encoded and the raw token is not stored.
    pub fn basic(email: &str, token: &str) -> Self {
        Self {
            email: email.to_string(),
            auth_header: build_basic_header(email, token),
        }
    }

    /// Create Bearer auth credentials from a personal access token.
    pub fn bearer(token: &str) -> Self {
        Self {
            email: String::new(),
            auth_header: format!("Bearer {}", token),
        }
    }

    /// Create credentials of the given kind.
    pub fn new(kind: AuthKind, email: &str, token: &str) -> Self {
        match kind {
            AuthKind::Basic => Self::basic(email, token),
            AuthKind::Bearer => Self::bearer(token),
        }
    }

    /// Resolve the token for `profile_name` and build credentials.
    ///
    /// The `JIRAKIT_API_TOKEN` environment variable takes precedence over the
    /// keyring.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is available from either source.
    pub fn resolve(kind: AuthKind, profile_name: &str, email: &str) -> Result<Self> {
        let token = match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.is_empty() => token,
            _ => get_token(profile_name)?,
        };
        Ok(Self::new(kind, email, &token))
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the email address.
    pub fn email(&self) -> &str {
        &self.email
    }
}

fn build_basic_header(email: &str, token: &str) -> String {
    let credentials = format!("{}:{}", email, token);
    format!("Basic {}", BASE64.encode(credentials.as_bytes()))
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))
}

/// Store an API token in the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<()> {
    keyring_entry(profile_name)?
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))
}

/// Retrieve an API token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be retrieved from the keyring.
pub fn get_token(profile_name: &str) -> Result<String> {
    keyring_entry(profile_name)?
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}

/// Delete an API token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be deleted from the keyring.
pub fn delete_token(profile_name: &str) -> Result<()> {
    keyring_entry(profile_name)?
        .delete_password()
        .map_err(|e| ApiError::Keyring(format!("failed to delete token: {}", e)))
}
