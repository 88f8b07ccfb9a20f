//! Search endpoints wired into the pagination cursors.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use super::error::{ApiError, Result};
use super::transport::Transport;
use super::types::Issue;
use crate::search::{
    OffsetIterator, OffsetPage, OffsetSource, SearchOptions, TokenIterator, TokenPage,
    TokenSource, DEFAULT_PAGE_SIZE, DEFAULT_TOKEN_PAGE_SIZE, MAX_OFFSET_PAGE_SIZE,
};

/// Offset-paginated issue search.
const SEARCH_PATH: &str = "/rest/api/3/search";

/// Token-paginated issue search.
const SEARCH_JQL_PATH: &str = "/rest/api/3/search/jql";

/// Issue search over a transport.
pub struct SearchService<'a, C> {
    transport: &'a C,
}

impl<C> Clone for SearchService<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for SearchService<'_, C> {}

impl<'a, C: Transport> SearchService<'a, C> {
    pub fn new(transport: &'a C) -> Self {
        Self { transport }
    }

    /// Fetch one offset page starting at `options.start_at`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for an empty JQL query, or any
    /// transport/decode error.
    pub async fn search(&self, options: &SearchOptions) -> Result<OffsetPage<Issue>> {
        self.fetch_offset_page(options, options.start_at).await
    }

    /// Fetch one token page; `page_token` is `None` for the first page.
    pub async fn search_jql(
        &self,
        options: &SearchOptions,
        page_token: Option<&str>,
    ) -> Result<TokenPage<Issue>> {
        self.fetch_token_page(options, page_token).await
    }

    /// A cursor over every issue matching `options`, using offset pagination.
    pub fn iter(&self, options: &SearchOptions) -> Result<OffsetIterator<Self>> {
        require_jql(options)?;
        Ok(OffsetIterator::new(*self, options))
    }

    /// A cursor over every issue matching `options`, using token pagination.
    pub fn iter_jql(&self, options: &SearchOptions) -> Result<TokenIterator<Self>> {
        require_jql(options)?;
        Ok(TokenIterator::new(*self, options))
    }
}

#[async_trait]
impl<'a, C: Transport> OffsetSource for SearchService<'a, C> {
    type Item = Issue;

    #[instrument(skip(self, options), fields(jql = %options.jql))]
    async fn fetch_offset_page(
        &self,
        options: &SearchOptions,
        start_at: u32,
    ) -> Result<OffsetPage<Issue>> {
        require_jql(options)?;

        let mut body = Map::new();
        body.insert("jql".to_string(), json!(options.jql));
        body.insert("startAt".to_string(), json!(start_at));
        body.insert(
            "maxResults".to_string(),
            json!(options.page_size_or(DEFAULT_PAGE_SIZE).min(MAX_OFFSET_PAGE_SIZE)),
        );
        insert_list(&mut body, "fields", &options.fields);
        insert_list(&mut body, "expand", &options.expand);
        insert_list(&mut body, "properties", &options.properties);

        let request = self
            .transport
            .build_request(Method::POST, SEARCH_PATH, Some(Value::Object(body)))?;
        let response = self.transport.execute(request).await?;
        let page: OffsetPage<Issue> = self.transport.decode(&response)?;

        debug!(
            "Found {} issues (startAt: {}, total: {})",
            page.items.len(),
            page.start_at,
            page.total
        );
        Ok(page)
    }
}

#[async_trait]
impl<'a, C: Transport> TokenSource for SearchService<'a, C> {
    type Item = Issue;

    #[instrument(skip(self, options, page_token), fields(jql = %options.jql))]
    async fn fetch_token_page(
        &self,
        options: &SearchOptions,
        page_token: Option<&str>,
    ) -> Result<TokenPage<Issue>> {
        require_jql(options)?;

        let mut body = Map::new();
        body.insert("jql".to_string(), json!(options.jql));
        body.insert(
            "maxResults".to_string(),
            json!(options.page_size_or(DEFAULT_TOKEN_PAGE_SIZE)),
        );
        insert_list(&mut body, "fields", &options.fields);
        if !options.expand.is_empty() {
            // This endpoint takes expansions as one comma-separated string.
            body.insert("expand".to_string(), json!(options.expand.join(",")));
        }
        insert_list(&mut body, "properties", &options.properties);
        if let Some(token) = page_token {
            body.insert("nextPageToken".to_string(), json!(token));
        }

        let request =
            self.transport
                .build_request(Method::POST, SEARCH_JQL_PATH, Some(Value::Object(body)))?;
        let response = self.transport.execute(request).await?;
        let page: TokenPage<Issue> = self.transport.decode(&response)?;

        debug!(
            "Found {} issues (more: {})",
            page.items.len(),
            !page.is_last()
        );
        Ok(page)
    }
}

/// Any offset-paginated GET endpoint that takes `startAt` and `maxResults`
/// query parameters, such as `/rest/api/3/project/search` or
/// `/rest/agile/1.0/board`.
///
/// Only the page size from [`SearchOptions`] is used; endpoint-specific
/// filters go in [`OffsetEndpoint::with_param`].
pub struct OffsetEndpoint<'a, C, T> {
    transport: &'a C,
    path: String,
    params: Vec<(String, String)>,
    _item: PhantomData<fn() -> T>,
}

impl<'a, C: Transport, T: DeserializeOwned + Send + Sync> OffsetEndpoint<'a, C, T> {
    pub fn new(transport: &'a C, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
            params: Vec::new(),
            _item: PhantomData,
        }
    }

    /// Add a fixed query parameter sent with every page request.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// A cursor over every item of the endpoint.
    pub fn iter(self, options: &SearchOptions) -> OffsetIterator<Self> {
        OffsetIterator::new(self, options)
    }
}

#[async_trait]
impl<'a, C: Transport, T: DeserializeOwned + Send + Sync> OffsetSource
    for OffsetEndpoint<'a, C, T>
{
    type Item = T;

    async fn fetch_offset_page(
        &self,
        options: &SearchOptions,
        start_at: u32,
    ) -> Result<OffsetPage<T>> {
        debug!(path = %self.path, start_at, "Fetching endpoint page");
        let mut request = self.transport.build_request(Method::GET, &self.path, None)?;
        request.query.extend(self.params.iter().cloned());
        let request = request
            .with_query("startAt", start_at)
            .with_query("maxResults", options.page_size_or(DEFAULT_PAGE_SIZE));

        let response = self.transport.execute(request).await?;
        self.transport.decode(&response)
    }
}

fn require_jql(options: &SearchOptions) -> Result<()> {
    if options.jql.trim().is_empty() {
        return Err(ApiError::invalid_input("JQL query is required"));
    }
    Ok(())
}

fn insert_list(body: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        body.insert(key.to_string(), json!(values));
    }
}
