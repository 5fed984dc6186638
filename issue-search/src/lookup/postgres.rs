//! PostgreSQL implementations of the lookup collaborators.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::traits::{
    ExactIssueLookup, IssueBrowser, Result, SearchError, TextIssueSearch,
};
use crate::types::{ResultItem, StateFilter};

/// Issue store backed by a PostgreSQL `issues` table.
///
/// One struct implements all three lookup contracts; they are read-only
/// queries over the same rows.
#[derive(Clone)]
pub struct PgIssueStore {
    pool: PgPool,
}

impl PgIssueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IssueRow {
    id: i64,
    number: i64,
    title: String,
    is_open: bool,
    url: String,
    repository_full_name: String,
    labels: Vec<String>,
}

impl From<IssueRow> for ResultItem {
    fn from(row: IssueRow) -> Self {
        ResultItem {
            id: row.id,
            number: row.number,
            title: row.title,
            is_open: row.is_open,
            url: row.url,
            repository: row.repository_full_name,
            labels: row.labels,
            is_exact_match: false,
            similarity: None,
        }
    }
}

fn repository_id_param(repository_ids: Option<&BTreeSet<i64>>) -> Option<Vec<i64>> {
    repository_ids.map(|ids| ids.iter().copied().collect())
}

#[async_trait]
impl ExactIssueLookup for PgIssueStore {
    async fn find_by_numbers(
        &self,
        numbers: &[i64],
        repository: Option<&str>,
        state: StateFilter,
        repository_ids: Option<&BTreeSet<i64>>,
        ct: &CancellationToken,
    ) -> Result<Vec<ResultItem>> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let rows: Vec<IssueRow> = sqlx::query_as(
            r#"
            SELECT id, number, title, is_open, url, repository_full_name, labels
            FROM issues
            WHERE number = ANY($1)
              AND ($2::text IS NULL OR repository_full_name = $2)
              AND ($3::boolean IS NULL OR is_open = $3)
              AND ($4::bigint[] IS NULL OR repository_id = ANY($4))
            ORDER BY number, repository_full_name
            "#,
        )
        .bind(numbers)
        .bind(repository)
        .bind(state.as_open_filter())
        .bind(repository_id_param(repository_ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ResultItem::from).collect())
    }
}

#[async_trait]
impl TextIssueSearch for PgIssueStore {
    async fn find_by_text(
        &self,
        text: &str,
        state: StateFilter,
        repository_ids: Option<&BTreeSet<i64>>,
        page: u32,
        page_size: u32,
        ct: &CancellationToken,
    ) -> Result<(Vec<ResultItem>, i64)> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let pattern = format!("%{}%", text);
        let offset = (page.max(1) as i64 - 1) * page_size as i64;

        let rows: Vec<IssueRow> = sqlx::query_as(
            r#"
            SELECT id, number, title, is_open, url, repository_full_name, labels
            FROM issues
            WHERE (title ILIKE $1 OR body ILIKE $1)
              AND ($2::boolean IS NULL OR is_open = $2)
              AND ($3::bigint[] IS NULL OR repository_id = ANY($3))
            ORDER BY number DESC, repository_full_name
            OFFSET $4
            LIMIT $5
            "#,
        )
        .bind(&pattern)
        .bind(state.as_open_filter())
        .bind(repository_id_param(repository_ids))
        .bind(offset)
        .bind(page_size as i64)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM issues
            WHERE (title ILIKE $1 OR body ILIKE $1)
              AND ($2::boolean IS NULL OR is_open = $2)
              AND ($3::bigint[] IS NULL OR repository_id = ANY($3))
            "#,
        )
        .bind(&pattern)
        .bind(state.as_open_filter())
        .bind(repository_id_param(repository_ids))
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(ResultItem::from).collect(), total))
    }
}

#[async_trait]
impl IssueBrowser for PgIssueStore {
    async fn list_by_repositories(
        &self,
        repository_ids: &BTreeSet<i64>,
        state: StateFilter,
        page: u32,
        page_size: u32,
        ct: &CancellationToken,
    ) -> Result<(Vec<ResultItem>, i64)> {
        if ct.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let ids: Vec<i64> = repository_ids.iter().copied().collect();
        let offset = (page.max(1) as i64 - 1) * page_size as i64;

        let rows: Vec<IssueRow> = sqlx::query_as(
            r#"
            SELECT id, number, title, is_open, url, repository_full_name, labels
            FROM issues
            WHERE repository_id = ANY($1)
              AND ($2::boolean IS NULL OR is_open = $2)
            ORDER BY number DESC, repository_full_name
            OFFSET $3
            LIMIT $4
            "#,
        )
        .bind(&ids)
        .bind(state.as_open_filter())
        .bind(offset)
        .bind(page_size as i64)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM issues
            WHERE repository_id = ANY($1)
              AND ($2::boolean IS NULL OR is_open = $2)
            "#,
        )
        .bind(&ids)
        .bind(state.as_open_filter())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(ResultItem::from).collect(), total))
    }
}
