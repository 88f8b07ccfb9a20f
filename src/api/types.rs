//! JIRA API response types.
//!
//! Issue fields are kept as raw JSON: the search engine only needs an item
//! to hand back, and callers pick the fields they asked for.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The current authenticated user.
///
/// Returned by `GET /rest/api/3/myself`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// The user's account ID.
    pub account_id: String,
    /// The user's display name.
    pub display_name: String,
    /// The user's email address (may be empty if hidden).
    #[serde(default)]
    pub email_address: String,
    /// Whether the user is active.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A JIRA issue as returned by search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// The issue ID.
    pub id: String,
    /// The issue key (e.g., "PROJ-123"). Absent when the key field was not
    /// requested from token-paginated search.
    #[serde(default)]
    pub key: String,
    /// URL of the issue resource.
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    /// The requested fields, untyped.
    #[serde(default)]
    pub fields: Value,
}

impl Issue {
    /// Look up a raw field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The summary field, if requested and present.
    pub fn summary(&self) -> Option<&str> {
        self.field("summary").and_then(Value::as_str)
    }

    /// The status name, if requested and present.
    pub fn status(&self) -> Option<&str> {
        self.field("status")
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = if self.key.is_empty() { &self.id } else { &self.key };
        match self.summary() {
            Some(summary) => write!(f, "{}: {}", id, summary),
            None => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_current_user() {
        let user: CurrentUser = serde_json::from_value(json!({
            "accountId": "5b10a2844c20165700ede21g",
            "displayName": "Mia Krystof"
        }))
        .unwrap();
        assert_eq!(user.display_name, "Mia Krystof");
        assert!(user.active);
        assert!(user.email_address.is_empty());
    }

    #[test]
    fn test_parse_issue_with_fields() {
        let issue: Issue = serde_json::from_value(json!({
            "id": "10002",
            "key": "ED-1",
            "self": "https://example.atlassian.net/rest/api/3/issue/10002",
            "fields": {
                "summary": "Login fails",
                "status": {"id": "3", "name": "In Progress"}
            }
        }))
        .unwrap();
        assert_eq!(issue.summary(), Some("Login fails"));
        assert_eq!(issue.status(), Some("In Progress"));
        assert_eq!(issue.to_string(), "ED-1: Login fails");
    }

    #[test]
    fn test_parse_id_only_issue() {
        let issue: Issue = serde_json::from_value(json!({"id": "10068"})).unwrap();
        assert!(issue.key.is_empty());
        assert!(issue.fields.is_null());
        assert_eq!(issue.summary(), None);
        assert_eq!(issue.to_string(), "10068");
    }
}
