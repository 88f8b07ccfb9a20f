//! Named connections to a JIRA instance.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::api::AuthKind;

/// One `[[profiles]]` entry.
///
/// Only the connection target lives here; the token is looked up in the
/// keyring under the profile name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Keyring account and `--profile` value. No whitespace.
    pub name: String,

    /// Instance base URL, e.g. `https://company.atlassian.net`.
    pub url: String,

    /// Account email, sent as the Basic auth user.
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub auth: AuthKind,
}

impl Profile {
    /// A profile using Basic auth as `email`.
    pub fn new(name: impl Into<String>, url: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            email: email.into(),
            auth: AuthKind::Basic,
        }
    }

    /// A profile presenting its token as a Bearer credential.
    pub fn bearer(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            email: String::new(),
            auth: AuthKind::Bearer,
        }
    }

    /// Check the fields a client needs before any request is made.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` naming the profile and the bad field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }
        if self.name.contains(char::is_whitespace) {
            return Err(self.invalid(format!("name '{}' contains whitespace", self.name)));
        }

        let has_scheme = ["https://", "http://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme));
        if !has_scheme {
            return Err(self.invalid(format!("url '{}' needs an http(s) scheme", self.url)));
        }

        match self.auth {
            AuthKind::Bearer => Ok(()),
            AuthKind::Basic if self.email.is_empty() => {
                Err(self.invalid("basic auth needs an email".to_string()))
            }
            AuthKind::Basic if !self.email.contains('@') => {
                Err(self.invalid(format!("'{}' is not an email address", self.email)))
            }
            AuthKind::Basic => Ok(()),
        }
    }

    fn invalid(&self, detail: String) -> ConfigError {
        ConfigError::ValidationError(format!("profile '{}': {}", self.name, detail))
    }
}
