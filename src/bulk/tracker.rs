//! Polls a server-side job until it reaches a terminal status.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use super::job::BulkJob;
use super::JobStatusSource;
use crate::api::{ApiError, Result};
use crate::context::Context;

/// Poll interval used when none (or zero) is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Waits for jobs reported by a [`JobStatusSource`].
///
/// Each wait owns its own timer: the first poll happens one interval after
/// the call starts, then once per interval until the job is terminal, the
/// status fetch fails, or the context is done. A fetch in flight when the
/// context finishes is dropped. A fetch failure is returned as-is and ends
/// the wait; nothing is retried here.
pub struct JobTracker<S> {
    source: S,
    poll_interval: Duration,
}

impl<S: JobStatusSource> JobTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the poll interval; zero restores [`DEFAULT_POLL_INTERVAL`].
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wait until `job_id` is terminal and return its final record.
    ///
    /// # Errors
    ///
    /// - `ApiError::InvalidInput` for an empty job id, before any request.
    /// - `ApiError::Context` when `ctx` is cancelled or its deadline passes.
    /// - Any error from fetching the job status.
    pub async fn wait(&self, ctx: &Context, job_id: &str) -> Result<BulkJob> {
        self.wait_with_progress(ctx, job_id, |_| {}).await
    }

    /// Like [`JobTracker::wait`], calling `on_poll` with every non-terminal
    /// snapshot.
    #[instrument(skip(self, ctx, on_poll))]
    pub async fn wait_with_progress<F>(
        &self,
        ctx: &Context,
        job_id: &str,
        mut on_poll: F,
    ) -> Result<BulkJob>
    where
        F: FnMut(&BulkJob) + Send,
    {
        if job_id.trim().is_empty() {
            return Err(ApiError::invalid_input("job id is required"));
        }

        let period = self.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls: u32 = 0;

        loop {
            tokio::select! {
                biased;
                reason = ctx.done() => {
                    warn!(polls, "Stopped waiting for job: {}", reason);
                    return Err(reason.into());
                }
                _ = ticker.tick() => {
                    polls += 1;
                    // The fetch itself must not outlive the context.
                    let job = tokio::select! {
                        biased;
                        reason = ctx.done() => {
                            warn!(polls, "Stopped waiting for job mid-fetch: {}", reason);
                            return Err(reason.into());
                        }
                        fetched = self.source.job_status(job_id) => fetched?,
                    };
                    debug!(polls, status = %job.status, progress = job.progress, "Polled job");

                    if job.is_terminal() {
                        info!(polls, status = %job.status, "Job reached terminal status");
                        return Ok(job);
                    }
                    on_poll(&job);
                }
            }
        }
    }
}
