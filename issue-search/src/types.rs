//! Core types for issue search.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Open/closed filter applied uniformly by every strategy.
///
/// Parsed leniently from request strings: `"open"` and `"closed"` select
/// the corresponding subset, everything else (including `"all"`) is
/// unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl StateFilter {
    /// Nullable boolean form used by the SQL backends: `None` means no
    /// state predicate at all.
    pub fn as_open_filter(self) -> Option<bool> {
        match self {
            StateFilter::All => None,
            StateFilter::Open => Some(true),
            StateFilter::Closed => Some(false),
        }
    }

    /// Whether an item with the given open flag passes this filter.
    pub fn matches(self, is_open: bool) -> bool {
        match self.as_open_filter() {
            None => true,
            Some(open) => open == is_open,
        }
    }
}

impl std::str::FromStr for StateFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "open" => StateFilter::Open,
            "closed" => StateFilter::Closed,
            _ => StateFilter::All,
        })
    }
}

impl std::fmt::Display for StateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateFilter::All => write!(f, "all"),
            StateFilter::Open => write!(f, "open"),
            StateFilter::Closed => write!(f, "closed"),
        }
    }
}

/// A ranked match returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ResultItem {
    /// Primary key of the indexed issue.
    pub id: i64,
    /// Issue number within its repository.
    pub number: i64,
    pub title: String,
    pub is_open: bool,
    /// Canonical URL of the issue.
    pub url: String,
    /// Owning repository, `owner/name` form.
    pub repository: String,
    pub labels: Vec<String>,
    /// True when the item was resolved from an explicit identifier token.
    pub is_exact_match: bool,
    /// Cosine similarity to the query embedding, set only on items sourced
    /// from the vector index. Higher is more similar.
    pub similarity: Option<f64>,
}

/// A row from the vector similarity index.
///
/// `similarity` is `1 - cosine_distance(item_embedding, query_embedding)`,
/// identical across backends.
#[derive(Debug, Clone)]
pub struct SimilarityHit {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub is_open: bool,
    pub url: String,
    pub repository_id: i64,
    pub repository_full_name: String,
    pub similarity: f64,
}

impl SimilarityHit {
    pub fn into_result_item(self) -> ResultItem {
        ResultItem {
            id: self.id,
            number: self.number,
            title: self.title,
            is_open: self.is_open,
            url: self.url,
            repository: self.repository_full_name,
            labels: Vec::new(),
            is_exact_match: false,
            similarity: Some(self.similarity),
        }
    }
}

/// Output of one strategy execution.
///
/// `items` already excludes everything in the exclusion set the strategy
/// was given; `found_ids` grows that set for the strategies that follow.
#[derive(Debug, Clone, Default)]
pub struct StrategyResult {
    pub items: Vec<ResultItem>,
    pub found_ids: HashSet<i64>,
    /// True when this result is a complete, authoritative page and no
    /// further strategy should run.
    pub is_terminal: bool,
    /// Total matches known by this strategy, present only when terminal.
    pub total_count: Option<i64>,
}

impl StrategyResult {
    /// Non-terminal result; `found_ids` is derived from the items.
    pub fn partial(items: Vec<ResultItem>) -> Self {
        let found_ids = items.iter().map(|item| item.id).collect();
        Self {
            items,
            found_ids,
            is_terminal: false,
            total_count: None,
        }
    }

    /// Terminal result carrying the collaborator's reported total.
    pub fn terminal(items: Vec<ResultItem>, total_count: i64) -> Self {
        let found_ids = items.iter().map(|item| item.id).collect();
        Self {
            items,
            found_ids,
            is_terminal: true,
            total_count: Some(total_count),
        }
    }
}

/// One merged, deduplicated page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub items: Vec<ResultItem>,
    pub total_count: i64,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_filter_parses_leniently() {
        assert_eq!("open".parse::<StateFilter>().unwrap(), StateFilter::Open);
        assert_eq!("Closed".parse::<StateFilter>().unwrap(), StateFilter::Closed);
        assert_eq!("all".parse::<StateFilter>().unwrap(), StateFilter::All);
        assert_eq!("anything".parse::<StateFilter>().unwrap(), StateFilter::All);
        assert_eq!("".parse::<StateFilter>().unwrap(), StateFilter::All);
    }

    #[test]
    fn state_filter_matches() {
        assert!(StateFilter::All.matches(true));
        assert!(StateFilter::All.matches(false));
        assert!(StateFilter::Open.matches(true));
        assert!(!StateFilter::Open.matches(false));
        assert!(StateFilter::Closed.matches(false));
        assert!(!StateFilter::Closed.matches(true));
    }

    #[test]
    fn strategy_result_derives_found_ids() {
        let items = vec![
            ResultItem {
                id: 1,
                number: 1,
                title: "a".into(),
                is_open: true,
                url: "https://example.com/1".into(),
                repository: "org/repo".into(),
                labels: vec![],
                is_exact_match: false,
                similarity: None,
            },
            ResultItem {
                id: 2,
                number: 2,
                title: "b".into(),
                is_open: true,
                url: "https://example.com/2".into(),
                repository: "org/repo".into(),
                labels: vec![],
                is_exact_match: false,
                similarity: None,
            },
        ];

        let result = StrategyResult::partial(items);
        assert_eq!(result.found_ids, HashSet::from([1, 2]));
        assert!(!result.is_terminal);
        assert!(result.total_count.is_none());

        let result = StrategyResult::terminal(vec![], 42);
        assert!(result.is_terminal);
        assert_eq!(result.total_count, Some(42));
    }
}
