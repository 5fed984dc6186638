//! Exact-identifier strategy: resolves `#42` / `owner/repo#42` tokens.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::criteria::SearchCriteria;
use crate::traits::{ExactIssueLookup, Result};
use crate::types::StrategyResult;

/// Resolves each parsed identifier through the exact lookup collaborator.
///
/// Identifier order is preserved in the output. An unqualified number
/// that exists in several repositories returns every match; the
/// `owner/repo` qualifier is the user's disambiguation mechanism, never
/// inferred.
pub struct ExactMatchStrategy {
    lookup: Arc<dyn ExactIssueLookup>,
}

impl ExactMatchStrategy {
    pub fn new(lookup: Arc<dyn ExactIssueLookup>) -> Self {
        Self { lookup }
    }

    pub async fn execute(
        &self,
        criteria: &SearchCriteria,
        exclude_ids: &HashSet<i64>,
        ct: &CancellationToken,
    ) -> Result<StrategyResult> {
        let mut items = Vec::new();
        let mut seen: HashSet<i64> = exclude_ids.clone();

        for issue_ref in &criteria.parsed_identifiers {
            let matches = self
                .lookup
                .find_by_numbers(
                    &[issue_ref.number],
                    issue_ref.repository.as_deref(),
                    criteria.state,
                    criteria.repository_ids.as_ref(),
                    ct,
                )
                .await?;

            for mut item in matches {
                if !seen.insert(item.id) {
                    continue;
                }
                item.is_exact_match = true;
                item.similarity = None;
                items.push(item);
            }
        }

        debug!(
            identifiers = criteria.parsed_identifiers.len(),
            found = items.len(),
            "exact-match lookup completed"
        );

        // Exact matches never close the page; semantic or browse results
        // may still be appended by the orchestrator.
        Ok(StrategyResult::partial(items))
    }
}
