//! Issue search core - strategy-chained search over indexed GitHub issues.
//!
//! Resolves a free-form query by running interchangeable strategies in
//! priority order and merging their results into one deduplicated page:
//!
//! - **Exact-match** - `#42` / `owner/repo#42` identifier resolution
//! - **Semantic** - embedding similarity with a silent text-search fallback
//! - **Repository browse** - plain paginated listing, terminal
//!
//! # Architecture
//!
//! The core is built around trait abstractions for testability:
//!
//! - [`Embedder`] - Query embedding generation (Gemini, mocks)
//! - [`SimilarityRepository`] - Vector index backends (pgvector, sqlite-vec, mocks)
//! - [`ExactIssueLookup`] / [`TextIssueSearch`] / [`IssueBrowser`] - issue
//!   store lookups
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use issue_search::{SearchService, StateFilter};
//! use issue_search::embedder::GeminiEmbedder;
//! use issue_search::lookup::PgIssueStore;
//! use issue_search::similarity::PgSimilarityRepository;
//! use tokio_util::sync::CancellationToken;
//!
//! let store = Arc::new(PgIssueStore::new(pool.clone()));
//! let service = SearchService::with_defaults(
//!     store.clone(),
//!     Arc::new(GeminiEmbedder::new()?),
//!     Arc::new(PgSimilarityRepository::new(pool)),
//!     store.clone(),
//!     store,
//! );
//!
//! let page = service
//!     .search("owner/repo#42 auth timeout", StateFilter::Open, None, 1, 20, &CancellationToken::new())
//!     .await?;
//! ```
//!
//! # Query syntax
//!
//! Identifier tokens are extracted first; whatever text remains drives
//! semantic search:
//!
//! - `"#42"` -> exact lookup in every visible repository
//! - `"owner/repo#42"` -> exact lookup in one repository
//! - `"auth timeout #42"` -> exact lookup plus semantic search for
//!   `"auth timeout"`
//! - `""` with a repository filter -> plain browsing

mod criteria;
mod orchestrator;
mod strategy;
mod traits;
mod types;

pub mod embedder;
pub mod lookup;
pub mod similarity;

pub use criteria::{IssueRef, SearchCriteria};
pub use orchestrator::{SearchConfig, SearchService};
pub use strategy::{
    ExactMatchStrategy, RepositoryBrowseStrategy, SearchStrategy, SemanticStrategy,
};
pub use traits::{
    Embedder, EmbeddingKind, ExactIssueLookup, IssueBrowser, Result, SearchError,
    SimilarityRepository, TextIssueSearch,
};
pub use types::{ResultItem, SearchPage, SimilarityHit, StateFilter, StrategyResult};
