//! Semantic strategy: embedding similarity with a silent text fallback.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::criteria::SearchCriteria;
use crate::traits::{
    Embedder, EmbeddingKind, Result, SearchError, SimilarityRepository, TextIssueSearch,
};
use crate::types::{ResultItem, StrategyResult};

/// Embeds the free-text portion of the query and ranks issues by vector
/// similarity. When no embedding can be produced, or the vector index is
/// unavailable, falls back to plain text search under the same filters;
/// the fallback is invisible to the caller.
pub struct SemanticStrategy {
    embedder: Arc<dyn Embedder>,
    similarity: Arc<dyn SimilarityRepository>,
    text_search: Arc<dyn TextIssueSearch>,
}

impl SemanticStrategy {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        similarity: Arc<dyn SimilarityRepository>,
        text_search: Arc<dyn TextIssueSearch>,
    ) -> Self {
        Self {
            embedder,
            similarity,
            text_search,
        }
    }

    pub async fn execute(
        &self,
        criteria: &SearchCriteria,
        exclude_ids: &HashSet<i64>,
        ct: &CancellationToken,
    ) -> Result<StrategyResult> {
        let query = criteria.semantic_text();

        let embedding = match self.embedder.embed(query, EmbeddingKind::Query, ct).await {
            Ok(Some(embedding)) => Some(embedding),
            Ok(None) => {
                debug!("embedding provider returned no vector, using text search");
                None
            }
            Err(SearchError::Cancelled) => return Err(SearchError::Cancelled),
            Err(e) => {
                warn!(error = %e, "embedding generation failed, using text search");
                None
            }
        };

        if let Some(embedding) = embedding {
            match self.search_vectors(criteria, &embedding, exclude_ids, ct).await {
                Ok(result) => return Ok(result),
                Err(SearchError::SimilarityUnavailable) => {
                    warn!("similarity search unavailable, using text search");
                }
                Err(e) => return Err(e),
            }
        }

        self.search_text(criteria, exclude_ids, ct).await
    }

    async fn search_vectors(
        &self,
        criteria: &SearchCriteria,
        embedding: &[f32],
        exclude_ids: &HashSet<i64>,
        ct: &CancellationToken,
    ) -> Result<StrategyResult> {
        let hits = self
            .similarity
            .search_by_similarity(
                embedding,
                criteria.state,
                criteria.offset(),
                criteria.page_size as i64,
                ct,
            )
            .await?;

        let items: Vec<ResultItem> = hits
            .into_iter()
            .filter(|hit| !exclude_ids.contains(&hit.id))
            .filter(|hit| match &criteria.repository_ids {
                // The vector contract has no repository parameter, so the
                // restriction is applied to the mapped hits here.
                Some(ids) => ids.contains(&hit.repository_id),
                None => true,
            })
            .map(|hit| hit.into_result_item())
            .collect();

        debug!(found = items.len(), "vector similarity search completed");
        Ok(StrategyResult::partial(items))
    }

    async fn search_text(
        &self,
        criteria: &SearchCriteria,
        exclude_ids: &HashSet<i64>,
        ct: &CancellationToken,
    ) -> Result<StrategyResult> {
        let (matches, _total) = self
            .text_search
            .find_by_text(
                criteria.semantic_text(),
                criteria.state,
                criteria.repository_ids.as_ref(),
                criteria.page,
                criteria.page_size,
                ct,
            )
            .await?;

        let items: Vec<ResultItem> = matches
            .into_iter()
            .filter(|item| !exclude_ids.contains(&item.id))
            .map(|mut item| {
                item.is_exact_match = false;
                item.similarity = None;
                item
            })
            .collect();

        debug!(found = items.len(), "text search fallback completed");
        Ok(StrategyResult::partial(items))
    }
}
