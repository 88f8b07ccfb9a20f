//! jirakit - JQL building, paginated search, and bulk job tracking for JIRA.
//!
//! The crate is organised around a single capability, [`api::Transport`],
//! which builds, sends, and decodes requests. On top of it:
//!
//! - [`search::QueryBuilder`] renders JQL with value quoting.
//! - [`search::OffsetIterator`] and [`search::TokenIterator`] walk the two
//!   pagination contracts JIRA uses through one [`search::SearchCursor`]
//!   shape.
//! - [`bulk::JobTracker`] polls asynchronous tasks to completion, racing a
//!   cancellable [`Context`].

pub mod api;
pub mod bulk;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod search;

pub use context::{Context, ContextError};
pub use error::{AppError, Result};
