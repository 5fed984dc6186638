//! Mock embedder implementation for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::traits::{Embedder, EmbeddingKind, Result, SearchError};

#[derive(Clone)]
enum MockResponse {
    Vector(Vec<f32>),
    None,
    Error(String),
}

/// Mock embedder with configurable responses and a call counter.
///
/// # Examples
///
/// ```ignore
/// // Always return the same vector
/// let embedder = MockEmbedder::returning(vec![0.1, 0.2]);
///
/// // Provider has no embedding for the input
/// let embedder = MockEmbedder::unavailable();
///
/// // Provider fails outright
/// let embedder = MockEmbedder::failing("quota exhausted");
/// ```
#[derive(Clone)]
pub struct MockEmbedder {
    response: MockResponse,
    call_count: Arc<AtomicUsize>,
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a mock that always returns the same vector.
    pub fn returning(vector: Vec<f32>) -> Self {
        let dims = vector.len();
        Self {
            response: MockResponse::Vector(vector),
            call_count: Arc::new(AtomicUsize::new(0)),
            dimensions: dims,
        }
    }

    /// Create a mock that always returns `Ok(None)`.
    pub fn unavailable() -> Self {
        Self {
            response: MockResponse::None,
            call_count: Arc::new(AtomicUsize::new(0)),
            dimensions: 0,
        }
    }

    /// Create a mock that always fails with an embedding error.
    pub fn failing(message: &str) -> Self {
        Self {
            response: MockResponse::Error(message.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
            dimensions: 0,
        }
    }

    /// Get the number of times `embed` was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::returning(vec![0.0; 4])
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(
        &self,
        _text: &str,
        _kind: EmbeddingKind,
        ct: &CancellationToken,
    ) -> Result<Option<Vec<f32>>> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            MockResponse::Vector(v) => Ok(Some(v.clone())),
            MockResponse::None => Ok(None),
            MockResponse::Error(message) => Err(SearchError::Embedding(message.clone())),
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_fixed_vector() {
        let embedder = MockEmbedder::returning(vec![1.0, 2.0, 3.0]);
        let ct = CancellationToken::new();

        let result = embedder.embed("test", EmbeddingKind::Query, &ct).await.unwrap();
        assert_eq!(result, Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(embedder.dimensions(), 3);
    }

    #[tokio::test]
    async fn mock_tracks_call_count_across_clones() {
        let embedder = MockEmbedder::default();
        let clone = embedder.clone();
        let ct = CancellationToken::new();

        assert_eq!(embedder.call_count(), 0);
        clone.embed("a", EmbeddingKind::Query, &ct).await.unwrap();
        clone.embed("b", EmbeddingKind::Document, &ct).await.unwrap();
        assert_eq!(embedder.call_count(), 2);
    }

    #[tokio::test]
    async fn mock_unavailable_and_failing() {
        let ct = CancellationToken::new();

        let embedder = MockEmbedder::unavailable();
        assert!(embedder
            .embed("a", EmbeddingKind::Query, &ct)
            .await
            .unwrap()
            .is_none());

        let embedder = MockEmbedder::failing("boom");
        let err = embedder.embed("a", EmbeddingKind::Query, &ct).await.unwrap_err();
        assert!(matches!(err, SearchError::Embedding(_)));
    }
}
