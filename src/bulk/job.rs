//! Asynchronous task records as reported by the server.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of a server-side task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Queued or in progress. A requested-but-unconfirmed cancellation is
    /// still running.
    #[serde(alias = "ENQUEUED", alias = "CANCEL_REQUESTED")]
    Running,
    /// Finished successfully.
    Complete,
    /// Finished with an error, or died without reporting.
    #[serde(alias = "DEAD")]
    Failed,
    /// Cancelled before completion.
    Cancelled,
}

impl JobStatus {
    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Running => "Running",
            JobStatus::Complete => "Complete",
            JobStatus::Failed => "Failed",
            JobStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// Success and error counts from a finished job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub error_count: u64,
}

/// A snapshot of a server-side job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkJob {
    /// Server-assigned identifier.
    #[serde(alias = "taskId")]
    pub id: String,
    /// Current status.
    pub status: JobStatus,
    /// Completion percentage, 0 to 100.
    #[serde(default, alias = "progressPercent")]
    pub progress: u32,
    /// Raw result payload; only meaningful once the job is terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Server message, typically set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BulkJob {
    /// Whether the job has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Success/error counts, once the job is terminal and the result carries
    /// them.
    pub fn summary(&self) -> Option<JobSummary> {
        if !self.is_terminal() {
            return None;
        }
        let result = self.result.as_ref()?;
        if !result.is_object() {
            return None;
        }
        serde_json::from_value(result.clone()).ok()
    }
}

impl fmt::Display for BulkJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} {} ({}%)", self.id, self.status, self.progress)?;
        if let Some(summary) = self.summary() {
            write!(
                f,
                ": {} succeeded, {} failed",
                summary.success_count, summary.error_count
            )?;
        }
        Ok(())
    }
}
