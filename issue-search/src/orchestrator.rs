//! Search orchestration: runs applicable strategies by descending
//! priority and folds their results into one page-bounded response.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::criteria::SearchCriteria;
use crate::strategy::{
    ExactMatchStrategy, RepositoryBrowseStrategy, SearchStrategy, SemanticStrategy,
};
use crate::traits::{
    Embedder, ExactIssueLookup, IssueBrowser, Result, SearchError, SimilarityRepository,
    TextIssueSearch,
};
use crate::types::{ResultItem, SearchPage, StateFilter, StrategyResult};

/// Configuration for the search service.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Default page size when the caller passes 0.
    pub default_page_size: u32,
    /// Hard cap on the page size.
    pub max_page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Accumulator of the strategy fold: merged items, the growing exclusion
/// set, and the terminal total once an authoritative strategy has run.
#[derive(Default)]
struct MergeState {
    merged: Vec<ResultItem>,
    exclude_ids: HashSet<i64>,
    terminal_total: Option<i64>,
}

impl MergeState {
    fn absorb(&mut self, result: StrategyResult) {
        self.exclude_ids.extend(result.found_ids.iter().copied());
        let contributed = result.items.len();
        self.merged.extend(result.items);
        if result.is_terminal {
            self.terminal_total = Some(result.total_count.unwrap_or(contributed as i64));
        }
    }

    fn is_terminal(&self) -> bool {
        self.terminal_total.is_some()
    }

    /// Close the fold: cap to the page size keeping the earliest
    /// (highest-priority) items. Without a terminal strategy the only
    /// honest total is the size of the page itself.
    fn into_page(mut self, page_size: u32) -> SearchPage {
        self.merged.truncate(page_size as usize);
        let total_count = self
            .terminal_total
            .unwrap_or(self.merged.len() as i64);
        SearchPage {
            items: self.merged,
            total_count,
        }
    }
}

/// Entry point of the search core.
///
/// Holds the strategy chain in descending priority order and exposes one
/// operation, [`SearchService::search`].
///
/// # Examples
///
/// ```ignore
/// let service = SearchService::with_defaults(lookup, embedder, vectors, text, browser);
/// let page = service
///     .search("owner/repo#42 crash", StateFilter::Open, None, 1, 20, &ct)
///     .await?;
/// ```
pub struct SearchService {
    strategies: Vec<SearchStrategy>,
    config: SearchConfig,
}

impl SearchService {
    /// Build the standard chain: exact-match, semantic, browse.
    pub fn new(
        lookup: Arc<dyn ExactIssueLookup>,
        embedder: Arc<dyn Embedder>,
        similarity: Arc<dyn SimilarityRepository>,
        text_search: Arc<dyn TextIssueSearch>,
        browser: Arc<dyn IssueBrowser>,
        config: SearchConfig,
    ) -> Self {
        let strategies = vec![
            SearchStrategy::Exact(ExactMatchStrategy::new(lookup)),
            SearchStrategy::Semantic(SemanticStrategy::new(embedder, similarity, text_search)),
            SearchStrategy::Browse(RepositoryBrowseStrategy::new(browser)),
        ];
        Self::from_strategies(strategies, config)
    }

    /// Build the standard chain with default configuration.
    pub fn with_defaults(
        lookup: Arc<dyn ExactIssueLookup>,
        embedder: Arc<dyn Embedder>,
        similarity: Arc<dyn SimilarityRepository>,
        text_search: Arc<dyn TextIssueSearch>,
        browser: Arc<dyn IssueBrowser>,
    ) -> Self {
        Self::new(
            lookup,
            embedder,
            similarity,
            text_search,
            browser,
            SearchConfig::default(),
        )
    }

    /// Build from an explicit strategy list; sorted here so callers never
    /// have to care about ordering.
    pub fn from_strategies(mut strategies: Vec<SearchStrategy>, config: SearchConfig) -> Self {
        strategies.sort_by(|a, b| b.priority().cmp(&a.priority()));
        Self { strategies, config }
    }

    /// Execute a search request.
    ///
    /// Strategies run sequentially in descending priority order; later
    /// strategies receive the ids already found so no id appears twice in
    /// the merged page. A terminal strategy stops the chain and supplies
    /// the authoritative total.
    ///
    /// Cancellation abandons the remaining chain and discards partial
    /// state; the caller gets [`SearchError::Cancelled`], never a partial
    /// page.
    pub async fn search(
        &self,
        raw_query: &str,
        state: StateFilter,
        repository_ids: Option<BTreeSet<i64>>,
        page: u32,
        page_size: u32,
        ct: &CancellationToken,
    ) -> Result<SearchPage> {
        let page_size = if page_size == 0 {
            self.config.default_page_size
        } else {
            page_size.min(self.config.max_page_size)
        };
        let criteria = SearchCriteria::parse(raw_query, state, repository_ids, page, page_size);

        let mut merge = MergeState::default();

        for strategy in &self.strategies {
            if merge.is_terminal() {
                break;
            }
            if ct.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            if !strategy.can_handle(&criteria) {
                continue;
            }

            let result = tokio::select! {
                biased;
                _ = ct.cancelled() => return Err(SearchError::Cancelled),
                result = strategy.execute(&criteria, &merge.exclude_ids, ct) => result?,
            };

            debug!(
                strategy = strategy.name(),
                found = result.items.len(),
                terminal = result.is_terminal,
                "strategy executed"
            );
            merge.absorb(result);
        }

        let page = merge.into_page(criteria.page_size);
        debug!(
            query = %criteria.raw_query,
            items = page.items.len(),
            total = page.total_count,
            "search completed"
        );
        Ok(page)
    }
}
