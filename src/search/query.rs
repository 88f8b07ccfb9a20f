//! JQL query builder.
//!
//! Clauses are kept as an ordered list of rendered fragments and joined with
//! single spaces on [`QueryBuilder::render`]. Values are quoted only when
//! they need it, so JQL functions such as `currentUser()` can be passed as
//! plain values.
//!
//! ```
//! use jirakit::search::QueryBuilder;
//!
//! let jql = QueryBuilder::new()
//!     .project("X")
//!     .and()
//!     .status("Open")
//!     .order_by("created", "DESC")
//!     .render();
//! assert_eq!(jql, "project = X AND status = Open ORDER BY created DESC");
//! ```

use std::fmt;

/// Characters that force a value to be quoted, in addition to whitespace.
const SPECIAL_CHARS: &[char] = &[
    '"', '\'', '=', '!', '<', '>', '~', ',', ';', '|', '&', '*', '%', '+', '?', '#', '^', '[',
    ']', '{', '}', '\\',
];

/// Sort direction for an `ORDER BY` clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction; only a case-insensitive `"DESC"` is descending.
    pub fn parse(direction: &str) -> Self {
        if direction.eq_ignore_ascii_case("DESC") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Accumulates JQL fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    fragments: Vec<String>,
}

impl QueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// `field = value`
    pub fn equals(mut self, field: &str, value: &str) -> Self {
        self.fragments.push(format!("{} = {}", field, quote(value)));
        self
    }

    /// `field ~ value`
    pub fn contains(mut self, field: &str, value: &str) -> Self {
        self.fragments.push(format!("{} ~ {}", field, quote(value)));
        self
    }

    /// `project = key`
    pub fn project(self, key: &str) -> Self {
        self.equals("project", key)
    }

    /// `status = value`
    pub fn status(self, status: &str) -> Self {
        self.equals("status", status)
    }

    /// `assignee = value`, or `assignee is EMPTY` for an empty value.
    pub fn assignee(mut self, assignee: &str) -> Self {
        if assignee.is_empty() {
            self.fragments.push("assignee is EMPTY".to_string());
            self
        } else {
            self.equals("assignee", assignee)
        }
    }

    /// `reporter = value`
    pub fn reporter(self, reporter: &str) -> Self {
        self.equals("reporter", reporter)
    }

    /// `issuetype = value`
    pub fn issue_type(self, issue_type: &str) -> Self {
        self.equals("issuetype", issue_type)
    }

    /// `priority = value`
    pub fn priority(self, priority: &str) -> Self {
        self.equals("priority", priority)
    }

    /// A single `labels = value` clause.
    pub fn label(self, label: &str) -> Self {
        self.equals("labels", label)
    }

    /// One `labels = value` clause per label, joined by `AND`.
    ///
    /// To match any of several labels, call [`QueryBuilder::label`]
    /// repeatedly with [`QueryBuilder::or`] in between.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, label) in labels.into_iter().enumerate() {
            if i > 0 {
                self.fragments.push("AND".to_string());
            }
            self = self.label(label.as_ref());
        }
        self
    }

    /// `summary ~ value`
    pub fn summary(self, text: &str) -> Self {
        self.contains("summary", text)
    }

    /// `text ~ value`, matching summary, description, and comments.
    pub fn text(self, text: &str) -> Self {
        self.contains("text", text)
    }

    /// Append `AND`. Does nothing on an empty builder.
    pub fn and(self) -> Self {
        self.operator("AND")
    }

    /// Append `OR`. Does nothing on an empty builder.
    pub fn or(self) -> Self {
        self.operator("OR")
    }

    /// Splice caller-supplied JQL in verbatim.
    pub fn raw(mut self, fragment: &str) -> Self {
        self.fragments.push(fragment.to_string());
        self
    }

    /// `ORDER BY field ASC|DESC`. Anything other than `"DESC"` (in any case)
    /// sorts ascending.
    pub fn order_by(mut self, field: &str, direction: &str) -> Self {
        self.fragments.push(format!(
            "ORDER BY {} {}",
            field,
            SortDirection::parse(direction).as_str()
        ));
        self
    }

    /// Whether no fragment has been appended.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Join the fragments with single spaces.
    pub fn render(&self) -> String {
        self.fragments.join(" ")
    }

    fn operator(mut self, op: &str) -> Self {
        if !self.fragments.is_empty() {
            self.fragments.push(op.to_string());
        }
        self
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Quote `value` if it is empty or contains whitespace or a special
/// character; embedded double quotes are backslash-escaped.
pub fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || SPECIAL_CHARS.contains(&c));

    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_order_by() {
        let jql = QueryBuilder::new()
            .project("X")
            .and()
            .status("Open")
            .order_by("created", "DESC")
            .render();
        assert_eq!(jql, "project = X AND status = Open ORDER BY created DESC");
    }

    #[test]
    fn test_summary_with_space_is_quoted() {
        assert_eq!(QueryBuilder::new().summary("a b").render(), r#"summary ~ "a b""#);
    }

    #[test]
    fn test_empty_builder_renders_empty_string() {
        assert_eq!(QueryBuilder::new().render(), "");
    }

    #[test]
    fn test_render_is_idempotent() {
        let builder = QueryBuilder::new().project("PROJ").or().text("crash");
        let first = builder.render();
        assert_eq!(builder.render(), first);
        assert_eq!(builder.to_string(), first);
    }

    #[test]
    fn test_quote_rules() {
        assert_eq!(quote(""), r#""""#);
        assert_eq!(quote("two words"), r#""two words""#);
        assert_eq!(quote("tab\there"), "\"tab\there\"");
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote("a,b"), r#""a,b""#);
        assert_eq!(quote("Open"), "Open");
        assert_eq!(quote("PROJ-123"), "PROJ-123");
        assert_eq!(quote("currentUser()"), "currentUser()");
    }

    #[test]
    fn test_function_value_passes_through() {
        let jql = QueryBuilder::new().assignee("currentUser()").render();
        assert_eq!(jql, "assignee = currentUser()");
    }

    #[test]
    fn test_empty_assignee_is_empty_clause() {
        let jql = QueryBuilder::new()
            .project("PROJ")
            .and()
            .assignee("")
            .render();
        assert_eq!(jql, "project = PROJ AND assignee is EMPTY");
    }

    #[test]
    fn test_empty_value_elsewhere_is_quoted() {
        assert_eq!(QueryBuilder::new().reporter("").render(), r#"reporter = """#);
    }

    #[test]
    fn test_operators_skipped_on_empty_builder() {
        let jql = QueryBuilder::new().and().or().status("Done").render();
        assert_eq!(jql, "status = Done");
    }

    #[test]
    fn test_operator_after_fragment_adds_one_token() {
        let jql = QueryBuilder::new().status("Done").or().render();
        assert_eq!(jql, "status = Done OR");
    }

    #[test]
    fn test_labels_expand_with_and() {
        let jql = QueryBuilder::new().labels(["backend", "urgent"]).render();
        assert_eq!(jql, "labels = backend AND labels = urgent");
    }

    #[test]
    fn test_labels_with_explicit_or() {
        let jql = QueryBuilder::new()
            .label("backend")
            .or()
            .label("frontend")
            .render();
        assert_eq!(jql, "labels = backend OR labels = frontend");
    }

    #[test]
    fn test_labels_empty_list_adds_nothing() {
        let builder = QueryBuilder::new().labels(Vec::<String>::new());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_order_by_defaults_ascending() {
        assert_eq!(
            QueryBuilder::new().order_by("updated", "").render(),
            "ORDER BY updated ASC"
        );
        assert_eq!(
            QueryBuilder::new().order_by("updated", "desc").render(),
            "ORDER BY updated DESC"
        );
        assert_eq!(
            QueryBuilder::new().order_by("updated", "descending").render(),
            "ORDER BY updated ASC"
        );
    }

    #[test]
    fn test_raw_fragment_is_not_escaped() {
        let jql = QueryBuilder::new()
            .issue_type("Bug")
            .and()
            .raw(r#"created >= -7d AND "Story Points" > 3"#)
            .render();
        assert_eq!(
            jql,
            r#"issuetype = Bug AND created >= -7d AND "Story Points" > 3"#
        );
    }

    #[test]
    fn test_priority_and_text_clauses() {
        let jql = QueryBuilder::new()
            .priority("High")
            .and()
            .text("null pointer")
            .render();
        assert_eq!(jql, r#"priority = High AND text ~ "null pointer""#);
    }

    #[test]
    fn test_named_field_appenders() {
        let jql = QueryBuilder::new()
            .project("PROJ")
            .and()
            .status("In Progress")
            .and()
            .reporter("currentUser()")
            .and()
            .issue_type("Story")
            .render();
        assert_eq!(
            jql,
            r#"project = PROJ AND status = "In Progress" AND reporter = currentUser() AND issuetype = Story"#
        );
    }
}
