//! In-memory similarity repository for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::traits::{Result, SearchError, SimilarityRepository};
use crate::types::{SimilarityHit, StateFilter};

#[derive(Debug, Clone)]
struct VectorRow {
    id: i64,
    number: i64,
    title: String,
    is_open: bool,
    url: String,
    repository_id: i64,
    repository_full_name: String,
    /// `None` models a row without an embedding: ineligible for search
    /// and excluded from totals.
    embedding: Option<Vec<f32>>,
}

/// Mock similarity repository backed by a brute-force cosine scan.
///
/// Implements the same ranking semantics as the SQL backends, so the
/// conformance suite in `similarity::mod` runs against it.
#[derive(Clone, Default)]
pub struct MockSimilarityRepository {
    rows: Arc<RwLock<Vec<VectorRow>>>,
    fail: bool,
    search_calls: Arc<AtomicUsize>,
}

impl MockSimilarityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an indexed issue with an embedding.
    #[allow(clippy::too_many_arguments)]
    pub fn with_vector(
        self,
        id: i64,
        number: i64,
        title: &str,
        is_open: bool,
        repository_id: i64,
        repository_full_name: &str,
        embedding: Vec<f32>,
    ) -> Self {
        self.push(id, number, title, is_open, repository_id, repository_full_name, Some(embedding));
        self
    }

    /// Add an issue without an embedding; it must never be returned.
    pub fn with_unembedded(
        self,
        id: i64,
        number: i64,
        title: &str,
        is_open: bool,
        repository_id: i64,
        repository_full_name: &str,
    ) -> Self {
        self.push(id, number, title, is_open, repository_id, repository_full_name, None);
        self
    }

    /// Make every call fail with `SimilarityUnavailable`.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of `search_by_similarity` invocations.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &self,
        id: i64,
        number: i64,
        title: &str,
        is_open: bool,
        repository_id: i64,
        repository_full_name: &str,
        embedding: Option<Vec<f32>>,
    ) {
        self.rows.write().unwrap().push(VectorRow {
            id,
            number,
            title: title.to_string(),
            is_open,
            url: format!("https://github.com/{repository_full_name}/issues/{number}"),
            repository_id,
            repository_full_name: repository_full_name.to_string(),
            embedding,
        });
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl SimilarityRepository for MockSimilarityRepository {
    async fn search_by_similarity(
        &self,
        embedding: &[f32],
        state: StateFilter,
        skip: i64,
        take: i64,
        ct: &CancellationToken,
    ) -> Result<Vec<SimilarityHit>> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::SimilarityUnavailable);
        }

        let rows = self.rows.read().unwrap();
        let mut hits: Vec<SimilarityHit> = rows
            .iter()
            .filter(|row| state.matches(row.is_open))
            .filter_map(|row| {
                let stored = row.embedding.as_ref()?;
                Some(SimilarityHit {
                    id: row.id,
                    number: row.number,
                    title: row.title.clone(),
                    is_open: row.is_open,
                    url: row.url.clone(),
                    repository_id: row.repository_id,
                    repository_full_name: row.repository_full_name.clone(),
                    similarity: cosine_similarity(stored, embedding),
                })
            })
            .collect();

        // Ascending distance == descending similarity; ties break on id
        // for deterministic paging.
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        Ok(hits
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(take.max(0) as usize)
            .collect())
    }

    async fn total_count(&self, state: StateFilter, ct: &CancellationToken) -> Result<i64> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if self.fail {
            return Err(SearchError::SimilarityUnavailable);
        }

        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.embedding.is_some() && state.matches(row.is_open))
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
