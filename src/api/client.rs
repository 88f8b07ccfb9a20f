//! HTTP transport for the JIRA REST API.
//!
//! [`JiraClient`] is the default [`Transport`] implementation. It owns the
//! `reqwest` client, the base URL and the authorization header, and applies
//! the configured resilience policy (pass-through unless retries are
//! configured).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use tracing::{debug, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::transport::{Request, Response, Transport};
use super::types::CurrentUser;
use crate::config::{Profile, ResilienceSettings};

/// The JIRA API client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    /// The HTTP client.
    client: Client,
    /// The base URL for the JIRA instance, without a trailing slash.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
    /// Retry policy for transient failures.
    resilience: ResilienceSettings,
}

impl JiraClient {
    /// Create a client from a profile, resolving the API token from the
    /// environment or the OS keyring.
    ///
    /// Does not contact the server; call [`JiraClient::validate_connection`]
    /// for that.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be resolved or the HTTP client
    /// cannot be built.
    #[instrument(skip(profile, resilience), fields(profile_name = %profile.name))]
    pub fn from_profile(profile: &Profile, resilience: ResilienceSettings) -> Result<Self> {
        info!("Creating JIRA client for profile");
        let auth = Auth::resolve(profile.auth, &profile.name, &profile.email)?;
        Self::with_auth(&profile.url, auth, resilience)
    }

    /// Create a client with explicit credentials and a pass-through policy.
    pub fn with_credentials(base_url: &str, email: &str, token: &str) -> Result<Self> {
        Self::with_auth(
            base_url,
            Auth::basic(email, token),
            ResilienceSettings::pass_through(),
        )
    }

    /// Create a client with prepared credentials.
    pub fn with_auth(base_url: &str, auth: Auth, resilience: ResilienceSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(resilience.request_timeout_secs))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            auth,
            resilience,
        })
    }

    /// Validate the connection by calling the `/myself` endpoint.
    #[instrument(skip(self))]
    pub async fn validate_connection(&self) -> Result<CurrentUser> {
        let request = self.build_request(Method::GET, "/rest/api/3/myself", None)?;
        let response = self.execute(request).await?;
        let user: CurrentUser = self.decode(&response)?;
        info!("Connected as user: {}", user.display_name);
        Ok(user)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request once and read the whole body.
    async fn send_once(&self, request: &Request) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;
        Ok(Response::new(status, url, body))
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }
}

#[async_trait]
impl Transport for JiraClient {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: Request) -> Result<Response> {
        let max_attempts = self.resilience.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("Request attempt {}/{}", attempt, max_attempts);

            let outcome = self.send_once(&request).await;
            let retryable = match &outcome {
                Ok(response) => Self::is_retryable_status(response.status),
                Err(e) => e.is_transient(),
            };

            if !retryable || attempt >= max_attempts {
                return outcome;
            }

            let delay = self.resilience.retry_delay(attempt);
            warn!(
                "Request failed (attempt {}), retrying in {}ms",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Normalize the base URL by removing trailing slashes.
///
/// Warns (without failing) on plain HTTP outside localhost.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ApiError::InvalidUrl(url.to_string()));
    }

    if !url.starts_with("https://") && !url.contains("localhost") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_removes_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net///").unwrap(),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_normalize_base_url_preserves_path() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net/jira/").unwrap(),
            "https://company.atlassian.net/jira"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_missing_scheme() {
        assert!(matches!(
            normalize_base_url("company.atlassian.net"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(JiraClient::is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(JiraClient::is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!JiraClient::is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!JiraClient::is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_with_credentials_is_pass_through() {
        let client =
            JiraClient::with_credentials("http://localhost:8080/", "a@b.dev", "token").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.resilience.max_retries, 0);
    }

    #[test]
    fn test_client_builds_requests_relative_to_base() {
        let client =
            JiraClient::with_credentials("http://localhost:8080", "a@b.dev", "token").unwrap();
        let request = client
            .build_request(Method::GET, "/rest/api/3/task/10001", None)
            .unwrap();
        assert_eq!(request.path, "/rest/api/3/task/10001");
        assert!(request.body.is_none());
    }
}
