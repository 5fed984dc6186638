//! Search strategies: the interchangeable units the orchestrator chains.
//!
//! The set of strategies is closed, so dispatch is a sum type rather than
//! trait objects: every variant answers `priority`, `can_handle`, and
//! `execute`.

mod browse;
mod exact;
mod semantic;

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;

pub use browse::RepositoryBrowseStrategy;
pub use exact::ExactMatchStrategy;
pub use semantic::SemanticStrategy;

use crate::criteria::SearchCriteria;
use crate::traits::Result;
use crate::types::StrategyResult;

/// One search strategy. Higher priority runs first.
pub enum SearchStrategy {
    Exact(ExactMatchStrategy),
    Semantic(SemanticStrategy),
    Browse(RepositoryBrowseStrategy),
}

impl SearchStrategy {
    /// Identifier matches are unambiguous and cheapest, so they run
    /// first; semantic search is the primary search-intent path; browse
    /// is the terminal fallback when no search intent exists.
    pub fn priority(&self) -> u8 {
        match self {
            SearchStrategy::Exact(_) => 100,
            SearchStrategy::Semantic(_) => 80,
            SearchStrategy::Browse(_) => 50,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::Exact(_) => "exact",
            SearchStrategy::Semantic(_) => "semantic",
            SearchStrategy::Browse(_) => "browse",
        }
    }

    /// Pure applicability predicate over the criteria; performs no I/O.
    pub fn can_handle(&self, criteria: &SearchCriteria) -> bool {
        match self {
            SearchStrategy::Exact(_) => !criteria.parsed_identifiers.is_empty(),
            SearchStrategy::Semantic(_) => !criteria.semantic_text().is_empty(),
            SearchStrategy::Browse(_) => {
                criteria.parsed_identifiers.is_empty()
                    && criteria.semantic_text().is_empty()
                    && criteria
                        .repository_ids
                        .as_ref()
                        .is_some_and(|ids| !ids.is_empty())
            }
        }
    }

    /// Run the strategy. Every id in `exclude_ids` must be absent from
    /// the returned items.
    pub async fn execute(
        &self,
        criteria: &SearchCriteria,
        exclude_ids: &HashSet<i64>,
        ct: &CancellationToken,
    ) -> Result<StrategyResult> {
        match self {
            SearchStrategy::Exact(s) => s.execute(criteria, exclude_ids, ct).await,
            SearchStrategy::Semantic(s) => s.execute(criteria, exclude_ids, ct).await,
            SearchStrategy::Browse(s) => s.execute(criteria, exclude_ids, ct).await,
        }
    }
}
