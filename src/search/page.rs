//! The two page shapes returned by paginated endpoints.

use serde::{Deserialize, Serialize};

/// A page from an offset-paginated endpoint.
///
/// The server reports where the page starts and how many results exist in
/// total, which allows exact progress reporting at the cost of the server
/// counting every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage<T> {
    /// Index of the first item of this page within the full result set.
    #[serde(default)]
    pub start_at: u32,
    /// Page size the server applied.
    #[serde(default)]
    pub max_results: u32,
    /// Total number of matching items.
    #[serde(default)]
    pub total: u32,
    /// The items on this page. `/search` calls them `issues`, most other
    /// endpoints `values`.
    #[serde(default = "Vec::new", alias = "issues", alias = "values")]
    pub items: Vec<T>,
}

impl<T> OffsetPage<T> {
    /// Whether no page follows this one: `start_at + items.len() >= total`.
    pub fn is_last(&self) -> bool {
        u64::from(self.start_at) + self.items.len() as u64 >= u64::from(self.total)
    }

    /// The `start_at` to request for the following page.
    pub fn next_start(&self) -> u32 {
        self.start_at.saturating_add(self.items.len() as u32)
    }
}

/// A page from a continuation-token endpoint.
///
/// No total is ever reported; the only signal that more data exists is a
/// non-empty `next_page_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPage<T> {
    /// The items on this page.
    #[serde(default = "Vec::new", alias = "issues", alias = "values")]
    pub items: Vec<T>,
    /// Page size hint, when the server reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    /// Opaque token for the next page; absent or empty means no more pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T> TokenPage<T> {
    /// The continuation token, if it is present and non-empty.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether no page follows this one.
    pub fn is_last(&self) -> bool {
        self.next_token().is_none()
    }
}
