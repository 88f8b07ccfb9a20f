//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::error::{ApiError, Result};
use super::transport::{Request, Response, Transport};

/// A transport that replays queued replies and records every request.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with a JSON body.
    pub fn push_json(&self, body: Value) {
        self.push_status(StatusCode::OK, body);
    }

    /// Queue a response with an explicit status.
    pub fn push_status(&self, status: StatusCode, body: Value) {
        let response = Response::new(status, "http://localhost", body.to_string());
        self.replies.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, err: ApiError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    /// All requests executed so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests executed so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::ServerError("no scripted reply".to_string())))
    }
}
