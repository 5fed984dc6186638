//! SQLite similarity backend over the sqlite-vec extension.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::traits::{Result, SearchError, SimilarityRepository};
use crate::types::{SimilarityHit, StateFilter};

/// SQLite-backed similarity repository.
///
/// SQLite has no distance operator, so the same semantics are written as
/// raw parameterized SQL over sqlite-vec's `vec_distance_cosine` function.
/// Embeddings live in a BLOB column holding the extension's native vector
/// representation (packed little-endian f32), and the query embedding is
/// bound in the same format. Similarity is `1 - vec_distance_cosine(...)`,
/// matching the Postgres backend exactly.
///
/// The pool must come from a connection with the `vec0` extension loaded
/// (`SqliteConnectOptions::extension("vec0")`); loading stays at the
/// composition root alongside pool construction.
#[derive(Clone)]
pub struct SqliteSimilarityRepository {
    pool: SqlitePool,
}

impl SqliteSimilarityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Pack an embedding into sqlite-vec's float32 blob layout.
fn vector_blob(embedding: &[f32]) -> Vec<u8> {
    embedding
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect()
}

#[derive(sqlx::FromRow)]
struct SimilarityRow {
    id: i64,
    number: i64,
    title: String,
    is_open: bool,
    url: String,
    repository_id: i64,
    repository_full_name: String,
    similarity: f64,
}

#[async_trait]
impl SimilarityRepository for SqliteSimilarityRepository {
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

        let rows: Vec<SimilarityRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                number,
                title,
                is_open,
                url,
                repository_id,
                repository_full_name,
                (1.0 - vec_distance_cosine(embedding, ?1)) AS similarity
            FROM issues
            WHERE embedding IS NOT NULL
              AND (?2 IS NULL OR is_open = ?2)
            ORDER BY vec_distance_cosine(embedding, ?1)
            LIMIT ?4 OFFSET ?3
            "#,
        )
        .bind(vector_blob(embedding))
        .bind(state.as_open_filter())
        .bind(skip)
        .bind(take)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "sqlite-vec similarity query failed");
            SearchError::SimilarityUnavailable
        })?;

        Ok(rows
            .into_iter()
            .map(|row| SimilarityHit {
                id: row.id,
                number: row.number,
                title: row.title,
                is_open: row.is_open,
                url: row.url,
                repository_id: row.repository_id,
                repository_full_name: row.repository_full_name,
                similarity: row.similarity,
            })
            .collect())
    }

    async fn total_count(&self, state: StateFilter, ct: &CancellationToken) -> Result<i64> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM issues
            WHERE embedding IS NOT NULL
              AND (?1 IS NULL OR is_open = ?1)
            "#,
        )
        .bind(state.as_open_filter())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "sqlite-vec count query failed");
            SearchError::SimilarityUnavailable
        })
    }
}
