//! Query normalization: identifier extraction and the criteria model.
//!
//! Transforms raw input like `"auth timeout in owner/repo#42"` into parsed
//! identifier tokens plus the free-text remainder used for semantic search.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::StateFilter;

/// A parsed numeric identifier token: `#42` or `owner/repo#42`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub number: i64,
    /// Optional `owner/repo` qualifier. When absent, the number matches in
    /// every repository the request is allowed to see.
    pub repository: Option<String>,
}

/// Normalized representation of one search request.
///
/// `parsed_identifiers` and `semantic_query` are derived once from
/// `raw_query` and never change afterwards; criteria are read-only input
/// to every strategy.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub raw_query: String,
    pub parsed_identifiers: Vec<IssueRef>,
    /// Free-text remainder after identifier tokens are stripped; `None`
    /// when the query consists solely of identifiers.
    pub semantic_query: Option<String>,
    pub state: StateFilter,
    /// Restricts results to these repositories; `None` means unrestricted.
    pub repository_ids: Option<BTreeSet<i64>>,
    pub page: u32,
    pub page_size: u32,
}

static ISSUE_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:([A-Za-z0-9][A-Za-z0-9_.-]*/[A-Za-z0-9][A-Za-z0-9_.-]*))?#(\d+)\b").unwrap()
});

impl SearchCriteria {
    /// Parse a raw request into criteria. `page` and `page_size` below 1
    /// are clamped to 1.
    pub fn parse(
        raw_query: &str,
        state: StateFilter,
        repository_ids: Option<BTreeSet<i64>>,
        page: u32,
        page_size: u32,
    ) -> Self {
        let (parsed_identifiers, remainder) = extract_identifiers(raw_query);
        let remainder = collapse_whitespace(&remainder);
        let semantic_query = (!remainder.is_empty()).then_some(remainder);

        Self {
            raw_query: raw_query.to_string(),
            parsed_identifiers,
            semantic_query,
            state,
            repository_ids,
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Trimmed semantic text, empty string when absent.
    pub fn semantic_text(&self) -> &str {
        self.semantic_query.as_deref().unwrap_or("").trim()
    }

    /// Row offset of the requested page.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }
}

/// Extract identifier tokens in order of appearance (deduplicated) and
/// return them together with the query text minus those tokens.
fn extract_identifiers(query: &str) -> (Vec<IssueRef>, String) {
    let mut refs: Vec<IssueRef> = Vec::new();

    for cap in ISSUE_REF_PATTERN.captures_iter(query) {
        let Ok(number) = cap[2].parse::<i64>() else {
            continue;
        };
        let issue_ref = IssueRef {
            number,
            repository: cap.get(1).map(|m| m.as_str().to_string()),
        };
        if !refs.contains(&issue_ref) {
            refs.push(issue_ref);
        }
    }

    let remainder = ISSUE_REF_PATTERN.replace_all(query, " ").to_string();
    (refs, remainder)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
