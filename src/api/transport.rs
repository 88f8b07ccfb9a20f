//! The transport capability consumed by the search and bulk engines.
//!
//! Services never talk to the network directly. They describe a request with
//! [`Transport::build_request`], hand it to [`Transport::execute`], and turn
//! the reply into a typed value with [`Transport::decode`]. The default
//! implementation lives in [`crate::api::JiraClient`]; tests substitute a
//! scripted transport.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::{ApiError, Result};

/// A transport-agnostic description of an API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the instance base URL, e.g. `/rest/api/3/search`.
    pub path: String,
    /// Query string parameters, in insertion order.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl Request {
    /// Create a request with no query parameters.
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Look up a query parameter by name.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A fully-read response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: StatusCode,
    /// The URL that produced the response, used in error messages.
    pub url: String,
    /// The raw response body.
    pub body: String,
}

impl Response {
    /// Create a response.
    pub fn new(status: StatusCode, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Capability to build, send, and decode API calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Describe a request for `method` on `path` with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the path cannot be used.
    fn build_request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Request> {
        if !path.starts_with('/') {
            return Err(ApiError::InvalidUrl(format!(
                "request path must start with '/': {}",
                path
            )));
        }
        Ok(Request::new(method, path, body))
    }

    /// Send the request and read the full response.
    ///
    /// Non-success statuses are returned as a `Response`; mapping them to
    /// errors is the job of [`Transport::decode`].
    async fn execute(&self, request: Request) -> Result<Response>;

    /// Decode a response body into `T`.
    ///
    /// # Errors
    ///
    /// Non-success statuses are mapped through [`error_from_response`];
    /// unparseable bodies yield `ApiError::InvalidResponse`.
    fn decode<T: DeserializeOwned>(&self, response: &Response) -> Result<T>
    where
        Self: Sized,
    {
        if !response.status.is_success() {
            debug!("Error response body: {}", response.body);
            return Err(error_from_response(
                response.status,
                &response.url,
                &response.body,
            ));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

/// Create an appropriate error from an HTTP status and body.
///
/// JIRA reports failures as `{"errorMessages": [...], "errors": {...}}`; the
/// messages are preferred over the bare URL when present.
pub fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    if body.is_empty() {
        return ApiError::from_status(status, url);
    }

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(arr) = json.get("errorMessages").and_then(Value::as_array) {
            if !arr.is_empty() {
                let joined = arr
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                return ApiError::from_status(status, &joined);
            }
        }
        if let Some(obj) = json.get("errors").and_then(Value::as_object) {
            let error_strings: Vec<String> =
                obj.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            if !error_strings.is_empty() {
                return ApiError::from_status(status, &error_strings.join(", "));
            }
        }
    }

    ApiError::from_status(status, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Ping {
        ok: bool,
    }

    #[test]
    fn test_build_request_rejects_relative_path() {
        let transport = MockTransport::new();
        let err = transport
            .build_request(Method::GET, "rest/api/3/myself", None)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_request_query_params() {
        let request = Request::new(Method::GET, "/rest/api/3/project/search", None)
            .with_query("startAt", 50)
            .with_query("maxResults", 25);
        assert_eq!(request.query_param("startAt"), Some("50"));
        assert_eq!(request.query_param("maxResults"), Some("25"));
        assert_eq!(request.query_param("missing"), None);
    }

    #[test]
    fn test_decode_success() {
        let transport = MockTransport::new();
        let response = Response::new(StatusCode::OK, "http://localhost/ping", r#"{"ok":true}"#);
        let ping: Ping = transport.decode(&response).unwrap();
        assert!(ping.ok);
    }

    #[test]
    fn test_decode_invalid_body() {
        let transport = MockTransport::new();
        let response = Response::new(StatusCode::OK, "http://localhost/ping", "not json");
        let err = transport.decode::<Ping>(&response).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_decode_error_messages() {
        let transport = MockTransport::new();
        let response = Response::new(
            StatusCode::BAD_REQUEST,
            "http://localhost/rest/api/3/search",
            r#"{"errorMessages":["Field 'foo' does not exist."],"errors":{}}"#,
        );
        match transport.decode::<Ping>(&response).unwrap_err() {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Field 'foo' does not exist."),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_response_field_errors() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            "http://localhost",
            r#"{"errorMessages":[],"errors":{"jql":"required"}}"#,
        );
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, r#"jql: "required""#),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_response_empty_body_uses_url() {
        let err = error_from_response(StatusCode::NOT_FOUND, "http://localhost/task/1", "");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "http://localhost/task/1"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
