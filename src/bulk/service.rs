//! Bulk operation and task endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::job::BulkJob;
use super::tracker::JobTracker;
use super::JobStatusSource;
use crate::api::{ApiError, Result, Transport};

/// Most issues a single bulk request may select.
pub const MAX_BULK_SELECTION: usize = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmittedTask {
    task_id: String,
}

/// Submits bulk operations and reads task status over a transport.
pub struct BulkService<'a, C> {
    transport: &'a C,
}

impl<C> Clone for BulkService<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for BulkService<'_, C> {}

impl<'a, C: Transport> BulkService<'a, C> {
    pub fn new(transport: &'a C) -> Self {
        Self { transport }
    }

    /// Submit a bulk delete of the given issue ids or keys and return the
    /// server-assigned task id.
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidInput` for an empty selection, a blank key, or more
    /// than [`MAX_BULK_SELECTION`] issues; otherwise any transport error.
    #[instrument(skip(self, issues), fields(count = issues.len()))]
    pub async fn submit_delete<S: AsRef<str>>(&self, issues: &[S]) -> Result<String> {
        if issues.is_empty() {
            return Err(ApiError::invalid_input("at least one issue is required"));
        }
        if issues.len() > MAX_BULK_SELECTION {
            return Err(ApiError::invalid_input(format!(
                "at most {} issues can be selected, got {}",
                MAX_BULK_SELECTION,
                issues.len()
            )));
        }
        let keys: Vec<&str> = issues.iter().map(AsRef::as_ref).collect();
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(ApiError::invalid_input("issue keys cannot be blank"));
        }

        let body = json!({ "selectedIssueIdsOrKeys": keys });
        let request =
            self.transport
                .build_request(Method::POST, "/rest/api/3/bulk/issues/delete", Some(body))?;
        let response = self.transport.execute(request).await?;
        let task: SubmittedTask = self.transport.decode(&response)?;

        info!(task_id = %task.task_id, "Bulk delete submitted");
        Ok(task.task_id)
    }

    /// Fetch the current record of a task.
    pub async fn task_status(&self, task_id: &str) -> Result<BulkJob> {
        let task_id = require_task_id(task_id)?;
        let path = format!("/rest/api/3/task/{}", urlencoding::encode(task_id));
        let request = self.transport.build_request(Method::GET, &path, None)?;
        let response = self.transport.execute(request).await?;
        self.transport.decode(&response)
    }

    /// Ask the server to cancel a running task.
    ///
    /// Cancellation is asynchronous: the task reports `Running` until the
    /// server confirms it as `Cancelled`.
    #[instrument(skip(self))]
    pub async fn cancel_task(&self, task_id: &str) -> Result<()> {
        let task_id = require_task_id(task_id)?;
        let path = format!("/rest/api/3/task/{}/cancel", urlencoding::encode(task_id));
        let request = self.transport.build_request(Method::POST, &path, None)?;
        let response = self.transport.execute(request).await?;
        if !response.status.is_success() {
            return Err(crate::api::error_from_response(
                response.status,
                &response.url,
                &response.body,
            ));
        }
        info!("Task cancellation requested");
        Ok(())
    }

    /// A tracker polling this service.
    pub fn tracker(&self) -> JobTracker<Self> {
        JobTracker::new(*self)
    }
}

#[async_trait]
impl<'a, C: Transport> JobStatusSource for BulkService<'a, C> {
    async fn job_status(&self, job_id: &str) -> Result<BulkJob> {
        self.task_status(job_id).await
    }
}

fn require_task_id(task_id: &str) -> Result<&str> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(ApiError::invalid_input("task id is required"));
    }
    Ok(task_id)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::testing::MockTransport;
    use crate::bulk::JobStatus;
    use crate::context::Context;
    use reqwest::StatusCode;

    #[tokio::test]
    async fn test_submit_delete_returns_task_id() {
        let transport = MockTransport::new();
        transport.push_json(json!({"taskId": "10641"}));

        let task_id = BulkService::new(&transport)
            .submit_delete(&["PROJ-1", "PROJ-2"])
            .await
            .unwrap();

        assert_eq!(task_id, "10641");
        let request = &transport.requests()[0];
        assert_eq!(request.path, "/rest/api/3/bulk/issues/delete");
        assert_eq!(
            request.body,
            Some(json!({"selectedIssueIdsOrKeys": ["PROJ-1", "PROJ-2"]}))
        );
    }

    #[tokio::test]
    async fn test_submit_delete_validates_before_network() {
        let transport = MockTransport::new();
        let service = BulkService::new(&transport);

        let empty: [&str; 0] = [];
        assert!(matches!(
            service.submit_delete(&empty).await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            service.submit_delete(&["PROJ-1", " "]).await,
            Err(ApiError::InvalidInput(_))
        ));
        let too_many: Vec<String> = (0..=MAX_BULK_SELECTION).map(|i| format!("P-{}", i)).collect();
        assert!(matches!(
            service.submit_delete(&too_many).await,
            Err(ApiError::InvalidInput(_))
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_task_status_path_is_encoded() {
        let transport = MockTransport::new();
        transport.push_json(json!({"id": "a b", "status": "RUNNING", "progress": 5}));

        let job = BulkService::new(&transport).task_status("a b").await.unwrap();

        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(transport.requests()[0].path, "/rest/api/3/task/a%20b");
    }

    #[tokio::test]
    async fn test_task_status_requires_id() {
        let transport = MockTransport::new();
        let err = BulkService::new(&transport).task_status("").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_task_maps_http_errors() {
        let transport = MockTransport::new();
        transport.push_status(StatusCode::NOT_FOUND, json!({"errorMessages": ["Task not found"]}));

        let err = BulkService::new(&transport).cancel_task("42").await.unwrap_err();

        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Task not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert_eq!(transport.requests()[0].path, "/rest/api/3/task/42/cancel");
    }

    #[tokio::test]
    async fn test_submit_then_track_to_completion() {
        let transport = MockTransport::new();
        transport.push_json(json!({"taskId": "77"}));
        transport.push_json(json!({"id": "77", "status": "ENQUEUED", "progress": 0}));
        transport.push_json(json!({"id": "77", "status": "RUNNING", "progress": 50}));
        transport.push_json(json!({
            "id": "77", "status": "COMPLETE", "progress": 100,
            "result": {"successCount": 2, "errorCount": 0}
        }));

        let service = BulkService::new(&transport);
        let task_id = service.submit_delete(&["PROJ-1", "PROJ-2"]).await.unwrap();
        let job = service
            .tracker()
            .with_poll_interval(Duration::from_millis(5))
            .wait(&Context::with_timeout(Duration::from_secs(5)), &task_id)
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Complete);
        assert_eq!(job.summary().unwrap().success_count, 2);
        assert_eq!(transport.request_count(), 4);
    }
}
