//! Vector similarity repository backends.
//!
//! One implementation per storage engine, one contract: results ordered
//! by ascending cosine distance, `similarity = 1 - cosine_distance`, only
//! rows with embeddings eligible. The conformance tests below pin those
//! semantics; they run against the in-memory mock and are written over
//! `&dyn SimilarityRepository` so a live-database harness can reuse them.

mod mock;
mod postgres;
mod sqlite;

pub use mock::MockSimilarityRepository;
pub use postgres::PgSimilarityRepository;
pub use sqlite::SqliteSimilarityRepository;

#[cfg(test)]
mod conformance {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::traits::SimilarityRepository;
    use crate::types::StateFilter;

    /// Corpus used by every conformance check: three embedded issues at
    /// distinct angles from the probe vector `[1, 0]`, plus one row
    /// without an embedding.
    fn corpus() -> MockSimilarityRepository {
        MockSimilarityRepository::new()
            .with_vector(1, 11, "exact direction", true, 1, "octo/a", vec![1.0, 0.0])
            .with_vector(2, 12, "nearby", true, 1, "octo/a", vec![0.9, 0.4359])
            .with_vector(3, 13, "orthogonal", false, 2, "octo/b", vec![0.0, 1.0])
            .with_unembedded(4, 14, "not indexed", true, 1, "octo/a")
    }

    async fn assert_descending_similarity(repo: &dyn SimilarityRepository) {
        let ct = CancellationToken::new();
        let hits = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::All, 0, 10, &ct)
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        for window in hits.windows(2) {
            assert!(window[0].similarity >= window[1].similarity);
        }
        assert_eq!(hits[0].id, 1);
        assert!((hits[0].similarity - 1.0).abs() < 1e-6);
    }

    async fn assert_state_semantics(repo: &dyn SimilarityRepository) {
        let ct = CancellationToken::new();

        let open = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::Open, 0, 10, &ct)
            .await
            .unwrap();
        assert!(open.iter().all(|h| h.is_open));
        assert_eq!(open.len(), 2);

        let closed = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::Closed, 0, 10, &ct)
            .await
            .unwrap();
        assert!(closed.iter().all(|h| !h.is_open));
        assert_eq!(closed.len(), 1);

        assert_eq!(repo.total_count(StateFilter::All, &ct).await.unwrap(), 3);
        assert_eq!(repo.total_count(StateFilter::Open, &ct).await.unwrap(), 2);
        assert_eq!(repo.total_count(StateFilter::Closed, &ct).await.unwrap(), 1);
    }

    async fn assert_paging_window(repo: &dyn SimilarityRepository) {
        let ct = CancellationToken::new();

        let all = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::All, 0, 10, &ct)
            .await
            .unwrap();
        let skipped = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::All, 1, 1, &ct)
            .await
            .unwrap();

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].id, all[1].id);

        let beyond = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::All, 10, 5, &ct)
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }

    async fn assert_unembedded_rows_excluded(repo: &dyn SimilarityRepository) {
        let ct = CancellationToken::new();
        let hits = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::All, 0, 10, &ct)
            .await
            .unwrap();
        assert!(hits.iter().all(|h| h.id != 4));
    }

    #[tokio::test]
    async fn mock_backend_conforms() {
        let repo = corpus();
        assert_descending_similarity(&repo).await;
        assert_state_semantics(&repo).await;
        assert_paging_window(&repo).await;
        assert_unembedded_rows_excluded(&repo).await;
    }

    #[tokio::test]
    async fn failure_is_generic() {
        let repo = corpus().with_failure();
        let ct = CancellationToken::new();
        let err = repo
            .search_by_similarity(&[1.0, 0.0], StateFilter::All, 0, 10, &ct)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "similarity search unavailable");
    }
}
