//! Lookup collaborator implementations: exact identifier resolution,
//! text search, and repository browsing over the issue store.

mod mock;
mod postgres;

pub use mock::MockIssueStore;
pub use postgres::PgIssueStore;
