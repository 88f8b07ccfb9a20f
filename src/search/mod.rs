//! Search: JQL building, page models, and lazy pagination cursors.
//!
//! JIRA exposes two incompatible pagination contracts. Offset endpoints
//! report `startAt`/`total` and are walked by index; token endpoints hand
//! back an opaque `nextPageToken` and never report a total. Both are walked
//! through the same [`SearchCursor`] shape, implemented once per model by
//! [`OffsetIterator`] and [`TokenIterator`].

mod offset;
mod options;
mod page;
pub mod query;
mod token;

use async_trait::async_trait;

use crate::api::{ApiError, Result};

pub use offset::OffsetIterator;
pub use options::SearchOptions;
pub use page::{OffsetPage, TokenPage};
pub use query::{QueryBuilder, SortDirection};
pub use token::TokenIterator;

/// Default page size for offset pagination.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Default page size for token pagination, which allows larger pages.
pub const DEFAULT_TOKEN_PAGE_SIZE: u32 = 100;

/// Largest page the offset search endpoint honours.
pub const MAX_OFFSET_PAGE_SIZE: u32 = 100;

/// Something that can fetch one page of an offset-paginated result set.
#[async_trait]
pub trait OffsetSource: Send + Sync {
    type Item: Send + Sync;

    /// Fetch the page starting at `start_at`, sized by `options.max_results`.
    async fn fetch_offset_page(
        &self,
        options: &SearchOptions,
        start_at: u32,
    ) -> Result<OffsetPage<Self::Item>>;
}

/// Something that can fetch one page of a token-paginated result set.
#[async_trait]
pub trait TokenSource: Send + Sync {
    type Item: Send + Sync;

    /// Fetch the page identified by `page_token`, or the first page for `None`.
    async fn fetch_token_page(
        &self,
        options: &SearchOptions,
        page_token: Option<&str>,
    ) -> Result<TokenPage<Self::Item>>;
}

/// A lazy cursor over every item of a paginated search.
///
/// `advance` moves to the next item, fetching pages as needed, and returns
/// whether an item is available. `current` is only `Some` after a successful
/// `advance`. Once `advance` returns `false` the cursor is finished;
/// `last_error` tells a failed fetch apart from a drained result set.
#[async_trait]
pub trait SearchCursor: Send {
    type Item: Send + Sync;

    /// Move to the next item.
    async fn advance(&mut self) -> bool;

    /// The item under the cursor.
    fn current(&self) -> Option<&Self::Item>;

    /// The fetch error that ended iteration, if any.
    fn last_error(&self) -> Option<&ApiError>;

    /// Take ownership of the fetch error that ended iteration.
    fn take_error(&mut self) -> Option<ApiError>;

    /// Drain the cursor into a vector.
    ///
    /// # Errors
    ///
    /// Returns the fetch error that ended iteration early.
    async fn try_collect(mut self) -> Result<Vec<Self::Item>>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        let mut items = Vec::new();
        while self.advance().await {
            if let Some(item) = self.current() {
                items.push(item.clone());
            }
        }
        match self.take_error() {
            Some(err) => Err(err),
            None => Ok(items),
        }
    }
}
