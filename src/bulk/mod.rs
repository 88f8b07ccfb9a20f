//! Bulk operations and long-running task tracking.
//!
//! Bulk edits and deletes run asynchronously on the server. Submitting one
//! returns a task id; [`JobTracker`] polls that id until the task reaches a
//! terminal [`JobStatus`] or the caller's [`crate::Context`] gives up.

mod job;
mod service;
mod tracker;

use async_trait::async_trait;

use crate::api::Result;

pub use job::{BulkJob, JobStatus, JobSummary};
pub use service::{BulkService, MAX_BULK_SELECTION};
pub use tracker::{JobTracker, DEFAULT_POLL_INTERVAL};

/// Something that can report the current state of a job.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, job_id: &str) -> Result<BulkJob>;
}
