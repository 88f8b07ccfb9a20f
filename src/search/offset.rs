//! Cursor over an offset-paginated search.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{OffsetPage, OffsetSource, SearchCursor, SearchOptions, DEFAULT_PAGE_SIZE};
use crate::api::ApiError;

/// Walks every item of an offset-paginated search, fetching pages lazily.
///
/// The first `advance` fetches the page at `options.start_at`. Each later
/// page starts at the previous `start_at` plus the number of items the
/// previous page actually returned. Iteration stops when the held page is
/// the last one, when a fetch returns no items, or when a fetch fails; in
/// the last case the error is kept for [`SearchCursor::last_error`].
pub struct OffsetIterator<S: OffsetSource> {
    source: S,
    options: SearchOptions,
    page: Option<OffsetPage<S::Item>>,
    index: Option<usize>,
    exhausted: bool,
    last_error: Option<ApiError>,
}

impl<S: OffsetSource> OffsetIterator<S> {
    /// Create a cursor over `source` with a private copy of `options`.
    ///
    /// A zero page size is replaced by [`DEFAULT_PAGE_SIZE`].
    pub fn new(source: S, options: &SearchOptions) -> Self {
        let mut options = options.clone();
        options.max_results = options.page_size_or(DEFAULT_PAGE_SIZE);
        Self {
            source,
            options,
            page: None,
            index: None,
            exhausted: false,
            last_error: None,
        }
    }

    /// The options this cursor sends.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// The page currently held, if any page has been fetched.
    pub fn page(&self) -> Option<&OffsetPage<S::Item>> {
        self.page.as_ref()
    }

    /// Total reported by the server for the most recent page.
    pub fn total(&self) -> Option<u32> {
        self.page.as_ref().map(|p| p.total)
    }

    fn finish(&mut self) -> bool {
        self.exhausted = true;
        self.index = None;
        false
    }
}

#[async_trait]
impl<S: OffsetSource> SearchCursor for OffsetIterator<S> {
    type Item = S::Item;

    async fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        let start_at = match &self.page {
            None => self.options.start_at,
            Some(page) => {
                let next = self.index.map_or(0, |i| i + 1);
                if next < page.items.len() {
                    self.index = Some(next);
                    return true;
                }
                if page.is_last() {
                    return self.finish();
                }
                page.next_start()
            }
        };

        debug!(start_at, max_results = self.options.max_results, "Fetching offset page");
        match self.source.fetch_offset_page(&self.options, start_at).await {
            Ok(page) => {
                let empty = page.items.is_empty();
                self.page = Some(page);
                if empty {
                    debug!(start_at, "Empty page, ending iteration");
                    return self.finish();
                }
                self.index = Some(0);
                true
            }
            Err(e) => {
                warn!(start_at, "Offset page fetch failed: {}", e);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fakes::{Call, ScriptedSource};

    fn page(start_at: u32, total: u32, items: &[&str]) -> crate::api::Result<OffsetPage<String>> {
        Ok(OffsetPage {
            start_at,
            max_results: 2,
            total,
            items: items.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn test_walks_two_pages_then_stops() {
        let source = ScriptedSource::new(vec![
            page(0, 3, &["i1", "i2"]),
            page(2, 3, &["i3"]),
        ]);
        let mut iter = OffsetIterator::new(&source, &SearchOptions::new("project = X"));

        let mut seen = Vec::new();
        while iter.advance().await {
            seen.push(iter.current().unwrap().clone());
        }

        assert_eq!(seen, vec!["i1", "i2", "i3"]);
        assert!(iter.last_error().is_none());
        assert!(iter.current().is_none());
        assert!(!iter.advance().await);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_next_start_uses_returned_item_count() {
        // Server returned fewer items than requested; the next start follows
        // what came back, not the page size.
        let source = ScriptedSource::new(vec![
            page(0, 5, &["a", "b"]),
            page(2, 5, &["c", "d", "e"]),
        ]);
        let options = SearchOptions::new("x").with_page_size(3);
        let items = OffsetIterator::new(&source, &options).try_collect().await.unwrap();

        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(
            source.calls(),
            vec![
                Call::Offset { start_at: 0, max_results: 3 },
                Call::Offset { start_at: 2, max_results: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn test_exactly_n_advances_succeed() {
        let source = ScriptedSource::new(vec![
            page(0, 4, &["a", "b"]),
            page(2, 4, &["c", "d"]),
        ]);
        let mut iter = OffsetIterator::new(&source, &SearchOptions::new("x"));
        for _ in 0..4 {
            assert!(iter.advance().await);
        }
        assert!(!iter.advance().await);
        assert!(iter.page().unwrap().is_last());
    }

    #[tokio::test]
    async fn test_current_is_none_before_first_advance() {
        let source = ScriptedSource::new(vec![page(0, 1, &["only"])]);
        let mut iter = OffsetIterator::new(&source, &SearchOptions::new("x"));
        assert!(iter.current().is_none());
        assert!(source.calls().is_empty());
        assert!(iter.advance().await);
        assert_eq!(iter.current().map(String::as_str), Some("only"));
        assert_eq!(iter.total(), Some(1));
    }

    #[tokio::test]
    async fn test_empty_page_terminates_despite_total() {
        let source = ScriptedSource::new(vec![page(0, 10, &["a", "b"]), page(2, 10, &[])]);
        let mut iter = OffsetIterator::new(&source, &SearchOptions::new("x"));
        assert!(iter.advance().await);
        assert!(iter.advance().await);
        assert!(!iter.advance().await);
        assert!(iter.last_error().is_none());
        assert!(iter.current().is_none());
        assert!(!iter.advance().await);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let source = ScriptedSource::new(vec![page(0, 0, &[])]);
        let items = OffsetIterator::new(&source, &SearchOptions::new("x"))
            .try_collect()
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_is_retained() {
        let source = ScriptedSource::new(vec![
            page(0, 4, &["a", "b"]),
            Err(ApiError::RateLimited),
        ]);
        let mut iter = OffsetIterator::new(&source, &SearchOptions::new("x"));
        assert!(iter.advance().await);
        assert!(iter.advance().await);
        assert!(!iter.advance().await);
        assert!(matches!(iter.last_error(), Some(ApiError::RateLimited)));
        assert!(iter.current().is_none());
    }

    #[tokio::test]
    async fn test_try_collect_surfaces_error() {
        let source: ScriptedSource<OffsetPage<String>> =
            ScriptedSource::new(vec![Err(ApiError::Unauthorized)]);
        let result = OffsetIterator::new(&source, &SearchOptions::new("x"))
            .try_collect()
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_default_page_size_and_start_offset() {
        let source = ScriptedSource::new(vec![page(10, 11, &["k"])]);
        let options = SearchOptions::new("x").starting_at(10);
        let mut iter = OffsetIterator::new(&source, &options);
        assert!(iter.advance().await);
        assert_eq!(
            source.calls(),
            vec![Call::Offset { start_at: 10, max_results: DEFAULT_PAGE_SIZE }]
        );
    }

    #[tokio::test]
    async fn test_caller_options_are_not_mutated() {
        let options = SearchOptions::new("project = X").with_fields(["summary", "status"]);
        let before = options.clone();
        let source = ScriptedSource::new(vec![page(0, 3, &["a", "b"]), page(2, 3, &["c"])]);

        let mut iter = OffsetIterator::new(&source, &options);
        while iter.advance().await {}

        assert_eq!(options, before);
        assert_eq!(options.max_results, 0);
        assert_eq!(iter.options().max_results, DEFAULT_PAGE_SIZE);
    }
}
