//! PostgreSQL similarity backend using the pgvector distance operator.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::traits::{Result, SearchError, SimilarityRepository};
use crate::types::{SimilarityHit, StateFilter};

/// PostgreSQL-backed similarity repository.
///
/// Expresses cosine distance with pgvector's in-query `<=>` operator and
/// binds the query embedding as a `vector` parameter. Similarity is
/// `1 - (embedding <=> query)`, so ascending distance order is descending
/// similarity order.
#[derive(Clone)]
pub struct PgSimilarityRepository {
    pool: PgPool,
}

impl PgSimilarityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
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

impl From<SimilarityRow> for SimilarityHit {
    fn from(row: SimilarityRow) -> Self {
        SimilarityHit {
            id: row.id,
            number: row.number,
            title: row.title,
            is_open: row.is_open,
            url: row.url,
            repository_id: row.repository_id,
            repository_full_name: row.repository_full_name,
            similarity: row.similarity,
        }
    }
}

#[async_trait]
impl SimilarityRepository for PgSimilarityRepository {
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
                (1 - (embedding <=> $1))::float8 AS similarity
            FROM issues
            WHERE embedding IS NOT NULL
              AND ($2::boolean IS NULL OR is_open = $2)
            ORDER BY embedding <=> $1
            OFFSET $3
            LIMIT $4
            "#,
        )
        .bind(Vector::from(embedding.to_vec()))
        .bind(state.as_open_filter())
        .bind(skip)
        .bind(take)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "pgvector similarity query failed");
            SearchError::SimilarityUnavailable
        })?;

        Ok(rows.into_iter().map(SimilarityHit::from).collect())
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
              AND ($1::boolean IS NULL OR is_open = $1)
            "#,
        )
        .bind(state.as_open_filter())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "pgvector count query failed");
            SearchError::SimilarityUnavailable
        })
    }
}
