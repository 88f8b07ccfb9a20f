//! Search call options shared by both pagination models.

use serde::{Deserialize, Serialize};

/// Options for a search call.
///
/// Iterators take their own copy of these at construction, so a caller can
/// keep and reuse the value it passed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// The JQL query text.
    pub jql: String,
    /// Index of the first result for offset pagination.
    pub start_at: u32,
    /// Page size. Zero selects the iterator's default.
    pub max_results: u32,
    /// Fields to return for each issue.
    pub fields: Vec<String>,
    /// Entities to expand (e.g. `renderedFields`, `changelog`).
    pub expand: Vec<String>,
    /// Issue properties to return.
    pub properties: Vec<String>,
}

impl SearchOptions {
    /// Create options for `jql` with every other setting at its default.
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            ..Self::default()
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the offset of the first result.
    pub fn starting_at(mut self, start_at: u32) -> Self {
        self.start_at = start_at;
        self
    }

    /// Set the returned fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the expansions.
    pub fn with_expand<I, S>(mut self, expand: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand = expand.into_iter().map(Into::into).collect();
        self
    }

    /// The page size to send, substituting `default` for zero.
    pub fn page_size_or(&self, default: u32) -> u32 {
        if self.max_results == 0 {
            default
        } else {
            self.max_results
        }
    }
}
