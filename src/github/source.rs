//! The repository source seam
//!
//! The launcher only ever needs two listings from the outside world. Keeping
//! them behind a trait lets the engine run against GitHub, a GitHub Enterprise
//! instance, or an in-memory fake in tests.

use super::types::Repository;
use crate::error::FetchError;
use async_trait::async_trait;

/// Outcome of a listing
pub type FetchResult = Result<Vec<Repository>, FetchError>;

/// Per-request parameters, captured from the settings snapshot at issue time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub api_url: String,
    pub page_size: u32,
    pub credential: Option<String>,
}

/// Search qualifiers beyond the free-text query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub language: Option<String>,
}

#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Repositories owned by `user`, most recently updated first
    async fn fetch_user_repositories(&self, user: &str, params: &FetchParams) -> FetchResult;

    /// Full-text repository search, most stars first
    async fn fetch_search_repositories(
        &self,
        query: &str,
        options: &SearchOptions,
        params: &FetchParams,
    ) -> FetchResult;
}
