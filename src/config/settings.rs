//! Application settings: pagination, bulk polling, and resilience tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::bulk::DEFAULT_POLL_INTERVAL;
use crate::search::{DEFAULT_PAGE_SIZE, DEFAULT_TOKEN_PAGE_SIZE, MAX_OFFSET_PAGE_SIZE};

/// Application-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// Search pagination.
    pub search: SearchSettings,
    /// Bulk job polling.
    pub bulk: BulkSettings,
    /// Transport resilience policy.
    pub resilience: ResilienceSettings,
}

impl Settings {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.resilience.validate()
    }
}

/// Page sizes for the two search pagination models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchSettings {
    /// Page size for offset-paginated searches.
    pub page_size: u32,
    /// Page size for token-paginated searches.
    pub token_page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            token_page_size: DEFAULT_TOKEN_PAGE_SIZE,
        }
    }
}

impl SearchSettings {
    fn validate(&self) -> Result<()> {
        if self.page_size > MAX_OFFSET_PAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "search.page_size must be at most {}",
                MAX_OFFSET_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

/// Bulk job polling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BulkSettings {
    /// Seconds between status polls. Zero selects the built-in default.
    pub poll_interval_secs: u64,
    /// Overall wait limit in seconds. Zero waits indefinitely.
    pub timeout_secs: u64,
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            timeout_secs: 0,
        }
    }
}

impl BulkSettings {
    /// The poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// The overall wait limit, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Transport resilience policy.
///
/// The default is pass-through: no retries. Retries only ever happen inside
/// the HTTP transport, never in the search or bulk engines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResilienceSettings {
    /// Retries for transient failures (rate limiting, 5xx, network).
    pub max_retries: u32,
    /// Base delay between retries in milliseconds; doubles per attempt.
    pub retry_delay_ms: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_delay_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl ResilienceSettings {
    /// A policy that sends every request exactly once.
    pub fn pass_through() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "resilience.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (1-based), with exponential backoff.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }
}
