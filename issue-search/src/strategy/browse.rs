//! Repository-browse strategy: paginated listing without search intent.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::criteria::SearchCriteria;
use crate::traits::{IssueBrowser, Result};
use crate::types::StrategyResult;

/// Last-resort strategy for "show me these repositories": delegates to
/// the paginated listing collaborator. Its result is always terminal, as
/// the underlying store already produced a complete, authoritative page
/// with a real total.
pub struct RepositoryBrowseStrategy {
    browser: Arc<dyn IssueBrowser>,
}

impl RepositoryBrowseStrategy {
    pub fn new(browser: Arc<dyn IssueBrowser>) -> Self {
        Self { browser }
    }

    pub async fn execute(
        &self,
        criteria: &SearchCriteria,
        exclude_ids: &HashSet<i64>,
        ct: &CancellationToken,
    ) -> Result<StrategyResult> {
        // can_handle guarantees a non-empty repository set.
        let repository_ids = criteria
            .repository_ids
            .clone()
            .unwrap_or_default();

        let (items, total_count) = self
            .browser
            .list_by_repositories(
                &repository_ids,
                criteria.state,
                criteria.page,
                criteria.page_size,
                ct,
            )
            .await?;

        let items: Vec<_> = items
            .into_iter()
            .filter(|item| !exclude_ids.contains(&item.id))
            .collect();

        debug!(
            repositories = repository_ids.len(),
            found = items.len(),
            total = total_count,
            "repository browse completed"
        );

        Ok(StrategyResult::terminal(items, total_count))
    }
}
