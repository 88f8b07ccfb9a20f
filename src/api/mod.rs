//! JIRA API transport, client, and types.
//!
//! This module provides the capability interface the search and bulk engines
//! consume, plus the default HTTP implementation of it.

mod auth;
mod client;
pub mod error;
pub mod search;
mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{delete_token, get_token, store_token, Auth, AuthKind, TOKEN_ENV_VAR};
pub use client::JiraClient;
pub use error::{ApiError, Result};
pub use search::{OffsetEndpoint, SearchService};
pub use transport::{error_from_response, Request, Response, Transport};
pub use types::{CurrentUser, Issue};
