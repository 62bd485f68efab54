//! GitHub repository source

pub mod client;
pub mod source;
pub mod types;

pub use client::GitHubClient;
pub use source::{FetchParams, FetchResult, RepositorySource, SearchOptions};
pub use types::Repository;
