//! Cursor over a continuation-token search.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{SearchCursor, SearchOptions, TokenPage, TokenSource, DEFAULT_TOKEN_PAGE_SIZE};
use crate::api::ApiError;

/// Walks every item of a token-paginated search, fetching pages lazily.
///
/// The held page's `nextPageToken` is the only pagination parameter sent for
/// the following page; no offset is ever computed. An absent or empty token,
/// or a page with no items, ends iteration. A failed fetch also ends it and
/// is reported through [`SearchCursor::last_error`].
pub struct TokenIterator<S: TokenSource> {
    source: S,
    options: SearchOptions,
    page: Option<TokenPage<S::Item>>,
    index: Option<usize>,
    exhausted: bool,
    last_error: Option<ApiError>,
    fetches: usize,
}

impl<S: TokenSource> TokenIterator<S> {
    /// Create a cursor over `source` with a private copy of `options`.
    ///
    /// A zero page size is replaced by [`DEFAULT_TOKEN_PAGE_SIZE`].
    pub fn new(source: S, options: &SearchOptions) -> Self {
        let mut options = options.clone();
        options.max_results = options.page_size_or(DEFAULT_TOKEN_PAGE_SIZE);
        Self {
            source,
            options,
            page: None,
            index: None,
            exhausted: false,
            last_error: None,
            fetches: 0,
        }
    }

    /// The options this cursor sends.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Number of page fetches issued so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    fn finish(&mut self) -> bool {
        self.exhausted = true;
        self.index = None;
        false
    }
}

#[async_trait]
impl<S: TokenSource> SearchCursor for TokenIterator<S> {
    type Item = S::Item;

    async fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        let token = match &self.page {
            None => None,
            Some(page) => {
                let next = self.index.map_or(0, |i| i + 1);
                if next < page.items.len() {
                    self.index = Some(next);
                    return true;
                }
                match page.next_token() {
                    Some(token) => Some(token.to_string()),
                    None => return self.finish(),
                }
            }
        };

        debug!(
            has_token = token.is_some(),
            max_results = self.options.max_results,
            "Fetching token page"
        );
        self.fetches += 1;
        match self
            .source
            .fetch_token_page(&self.options, token.as_deref())
            .await
        {
            Ok(page) => {
                let empty = page.items.is_empty();
                self.page = Some(page);
                if empty {
                    debug!("Empty page, ending iteration");
                    return self.finish();
                }
                self.index = Some(0);
                true
            }
            Err(e) => {
                warn!("Token page fetch failed: {}", e);
                self.last_error = Some(e);
                self.finish()
            }
        }
    }

    fn current(&self) -> Option<&Self::Item> {
        let index = self.index?;
        self.page.as_ref()?.items.get(index)
    }

    fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    fn take_error(&mut self) -> Option<ApiError> {
        self.last_error.take()
    }
}
