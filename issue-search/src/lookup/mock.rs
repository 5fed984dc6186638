//! In-memory issue store for testing the lookup collaborators.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::traits::{
    ExactIssueLookup, IssueBrowser, Result, SearchError, TextIssueSearch,
};
use crate::types::{ResultItem, StateFilter};

#[derive(Debug, Clone)]
struct StoredIssue {
    id: i64,
    number: i64,
    title: String,
    body: String,
    is_open: bool,
    repository_id: i64,
    repository_full_name: String,
    labels: Vec<String>,
}

impl StoredIssue {
    fn to_result_item(&self) -> ResultItem {
        ResultItem {
            id: self.id,
            number: self.number,
            title: self.title.clone(),
            is_open: self.is_open,
            url: format!(
                "https://github.com/{}/issues/{}",
                self.repository_full_name, self.number
            ),
            repository: self.repository_full_name.clone(),
            labels: self.labels.clone(),
            is_exact_match: false,
            similarity: None,
        }
    }

    fn in_repositories(&self, repository_ids: Option<&BTreeSet<i64>>) -> bool {
        match repository_ids {
            Some(ids) => ids.contains(&self.repository_id),
            None => true,
        }
    }
}

/// Mock issue store implementing all three lookup contracts, with call
/// counters for invocation assertions.
///
/// # Examples
///
/// ```ignore
/// let store = MockIssueStore::new()
///     .with_issue(1, 42, "Parser crash", true, 10, "octo/parser");
/// ```
#[derive(Clone, Default)]
pub struct MockIssueStore {
    issues: Arc<RwLock<Vec<StoredIssue>>>,
    fail_text_search: bool,
    exact_calls: Arc<AtomicUsize>,
    text_search_calls: Arc<AtomicUsize>,
    browse_calls: Arc<AtomicUsize>,
}

impl MockIssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue. Title doubles as the searchable body text.
    pub fn with_issue(
        self,
        id: i64,
        number: i64,
        title: &str,
        is_open: bool,
        repository_id: i64,
        repository_full_name: &str,
    ) -> Self {
        self.issues.write().unwrap().push(StoredIssue {
            id,
            number,
            title: title.to_string(),
            body: title.to_string(),
            is_open,
            repository_id,
            repository_full_name: repository_full_name.to_string(),
            labels: Vec::new(),
        });
        self
    }

    /// Make `find_by_text` fail, for fault-propagation tests.
    pub fn with_text_search_failure(mut self) -> Self {
        self.fail_text_search = true;
        self
    }

    pub fn exact_calls(&self) -> usize {
        self.exact_calls.load(Ordering::SeqCst)
    }

    pub fn text_search_calls(&self) -> usize {
        self.text_search_calls.load(Ordering::SeqCst)
    }

    pub fn browse_calls(&self) -> usize {
        self.browse_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExactIssueLookup for MockIssueStore {
    async fn find_by_numbers(
        &self,
        numbers: &[i64],
        repository: Option<&str>,
        state: StateFilter,
        repository_ids: Option<&BTreeSet<i64>>,
        ct: &CancellationToken,
    ) -> Result<Vec<ResultItem>> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        self.exact_calls.fetch_add(1, Ordering::SeqCst);

        let issues = self.issues.read().unwrap();
        let mut matches: Vec<&StoredIssue> = issues
            .iter()
            .filter(|issue| numbers.contains(&issue.number))
            .filter(|issue| match repository {
                Some(full_name) => issue.repository_full_name == full_name,
                None => true,
            })
            .filter(|issue| state.matches(issue.is_open))
            .filter(|issue| issue.in_repositories(repository_ids))
            .collect();
        matches.sort_by(|a, b| {
            a.number
                .cmp(&b.number)
                .then_with(|| a.repository_full_name.cmp(&b.repository_full_name))
        });

        Ok(matches.iter().map(|issue| issue.to_result_item()).collect())
    }
}

#[async_trait]
impl TextIssueSearch for MockIssueStore {
    async fn find_by_text(
        &self,
        text: &str,
        state: StateFilter,
        repository_ids: Option<&BTreeSet<i64>>,
        page: u32,
        page_size: u32,
        ct: &CancellationToken,
    ) -> Result<(Vec<ResultItem>, i64)> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        self.text_search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_text_search {
            return Err(SearchError::Lookup("text search failed".to_string()));
        }

        let needle = text.to_lowercase();
        let issues = self.issues.read().unwrap();
        let mut matches: Vec<&StoredIssue> = issues
            .iter()
            .filter(|issue| {
                issue.title.to_lowercase().contains(&needle)
                    || issue.body.to_lowercase().contains(&needle)
            })
            .filter(|issue| state.matches(issue.is_open))
            .filter(|issue| issue.in_repositories(repository_ids))
            .collect();
        matches.sort_by(|a, b| b.number.cmp(&a.number));

        let total = matches.len() as i64;
        let offset = (page.max(1) as usize - 1) * page_size as usize;
        let items = matches
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .map(|issue| issue.to_result_item())
            .collect();

        Ok((items, total))
    }
}

#[async_trait]
impl IssueBrowser for MockIssueStore {
    async fn list_by_repositories(
        &self,
        repository_ids: &BTreeSet<i64>,
        state: StateFilter,
        page: u32,
        page_size: u32,
        ct: &CancellationToken,
    ) -> Result<(Vec<ResultItem>, i64)> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        self.browse_calls.fetch_add(1, Ordering::SeqCst);

        let issues = self.issues.read().unwrap();
        let mut matches: Vec<&StoredIssue> = issues
            .iter()
            .filter(|issue| repository_ids.contains(&issue.repository_id))
            .filter(|issue| state.matches(issue.is_open))
            .collect();
        matches.sort_by(|a, b| b.number.cmp(&a.number));

        let total = matches.len() as i64;
        let offset = (page.max(1) as usize - 1) * page_size as usize;
        let items = matches
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .map(|issue| issue.to_result_item())
            .collect();

        Ok((items, total))
    }
}
