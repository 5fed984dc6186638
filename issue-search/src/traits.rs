//! Error type and collaborator contracts for the search core.
//!
//! The search core owns no storage of its own: every lookup path goes
//! through one of these narrow async abstractions, which also makes each
//! piece mockable in tests.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{ResultItem, SimilarityHit, StateFilter};

/// Error type for search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector index failure of any kind. Deliberately carries no
    /// backend-specific message so storage-engine error text never
    /// reaches callers; the semantic strategy treats this exactly like
    /// an embedding failure.
    #[error("similarity search unavailable")]
    SimilarityUnavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("search cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// What the embedded text is used for. Embedding APIs distinguish query
/// and document inputs, and the two are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingKind {
    Query,
    Document,
}

/// Text embedding generation.
///
/// `embed` returns `Ok(None)` when the provider has no embedding for the
/// input; callers treat that the same as an error, minus the logging.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(
        &self,
        text: &str,
        kind: EmbeddingKind,
        ct: &CancellationToken,
    ) -> Result<Option<Vec<f32>>>;

    /// Embedding dimensions produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Resolves parsed numeric identifiers to issues.
#[async_trait]
pub trait ExactIssueLookup: Send + Sync {
    /// Find issues by number. `repository` narrows the match to one
    /// `owner/name` when the user qualified the identifier; without it a
    /// number existing in several repositories yields every match.
    async fn find_by_numbers(
        &self,
        numbers: &[i64],
        repository: Option<&str>,
        state: StateFilter,
        repository_ids: Option<&BTreeSet<i64>>,
        ct: &CancellationToken,
    ) -> Result<Vec<ResultItem>>;
}

/// Keyword lookup, used only as the semantic-search fallback path.
#[async_trait]
pub trait TextIssueSearch: Send + Sync {
    /// Returns one page of matches plus the total match count.
    async fn find_by_text(
        &self,
        text: &str,
        state: StateFilter,
        repository_ids: Option<&BTreeSet<i64>>,
        page: u32,
        page_size: u32,
        ct: &CancellationToken,
    ) -> Result<(Vec<ResultItem>, i64)>;
}

/// Plain paginated listing for browsing without search intent.
#[async_trait]
pub trait IssueBrowser: Send + Sync {
    /// Returns one page of issues in the given repositories plus the
    /// total count under the same filters.
    async fn list_by_repositories(
        &self,
        repository_ids: &BTreeSet<i64>,
        state: StateFilter,
        page: u32,
        page_size: u32,
        ct: &CancellationToken,
    ) -> Result<(Vec<ResultItem>, i64)>;
}

/// Vector similarity over the issue corpus.
///
/// Implementations must agree on semantics regardless of storage engine:
/// results ordered by ascending cosine distance, `similarity` computed as
/// `1 - cosine_distance`, and only rows with a non-null embedding
/// eligible. Any backend failure surfaces as
/// [`SearchError::SimilarityUnavailable`].
#[async_trait]
pub trait SimilarityRepository: Send + Sync {
    async fn search_by_similarity(
        &self,
        embedding: &[f32],
        state: StateFilter,
        skip: i64,
        take: i64,
        ct: &CancellationToken,
    ) -> Result<Vec<SimilarityHit>>;

    /// Count of eligible rows under the state filter, independent of
    /// paging.
    async fn total_count(&self, state: StateFilter, ct: &CancellationToken) -> Result<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify traits are object-safe (can be used as trait objects)
    fn _assert_embedder_object_safe(_: &dyn Embedder) {}
    fn _assert_exact_lookup_object_safe(_: &dyn ExactIssueLookup) {}
    fn _assert_text_search_object_safe(_: &dyn TextIssueSearch) {}
    fn _assert_browser_object_safe(_: &dyn IssueBrowser) {}
    fn _assert_similarity_object_safe(_: &dyn SimilarityRepository) {}

    #[test]
    fn similarity_unavailable_hides_backend_detail() {
        let err = SearchError::SimilarityUnavailable;
        assert_eq!(err.to_string(), "similarity search unavailable");
    }
}
