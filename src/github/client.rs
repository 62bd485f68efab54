//! GitHub REST client for repository listings

use super::source::{FetchParams, FetchResult, RepositorySource, SearchOptions};
use super::types::{ApiErrorBody, Repository, SearchResponse};
use crate::error::{validate_username, FetchError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// GitHub API client
pub struct GitHubClient {
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new client
    pub fn new() -> Result<Self, FetchError> {
        let client = crate::http::github_client(Duration::from_secs(30))?;
        Ok(Self { client })
    }

    /// Build the request URL for a user's repository listing.
    ///
    /// With the user's own token `/user/repos` is used instead, which also
    /// returns private repositories.
    pub fn user_repos_url(user: &str, params: &FetchParams) -> String {
        if params.credential.is_some() {
            format!(
                "{}/user/repos?sort=updated&affiliation=owner&per_page={}",
                params.api_url, params.page_size
            )
        } else {
            format!(
                "{}/users/{}/repos?sort=updated&per_page={}",
                params.api_url,
                urlencoding::encode(user),
                params.page_size
            )
        }
    }

    /// Build the request URL for a repository search
    pub fn search_url(query: &str, options: &SearchOptions, params: &FetchParams) -> String {
        let mut q = query.trim().to_string();
        if let Some(lang) = options.language.as_deref().filter(|l| !l.trim().is_empty()) {
            q.push_str(" language:");
            q.push_str(lang.trim());
        }
        format!(
            "{}/search/repositories?q={}&sort=stars&order=desc&per_page={}",
            params.api_url,
            urlencoding::encode(&q),
            params.page_size
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);

        if let Some(token) = credential {
            request = request.header("Authorization", crate::http::bearer(token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or_else(|_| {
                    if text.trim().is_empty() {
                        status.canonical_reason().unwrap_or("request failed").to_string()
                    } else {
                        text
                    }
                });
            warn!("GitHub API error {} for {}: {}", status, url, message);
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn fetch_user_repositories(&self, user: &str, params: &FetchParams) -> FetchResult {
        validate_username(user)?;
        let url = Self::user_repos_url(user, params);
        let repos: Vec<Repository> = self.send(&url, params.credential.as_deref()).await?;
        debug!("Fetched {} repositories for {}", repos.len(), user);
        Ok(repos)
    }

    async fn fetch_search_repositories(
        &self,
        query: &str,
        options: &SearchOptions,
        params: &FetchParams,
    ) -> FetchResult {
        let url = Self::search_url(query, options, params);
        let response: SearchResponse = self.send(&url, params.credential.as_deref()).await?;
        debug!(
            "Search '{}' returned {} of {} repositories",
            query,
            response.items.len(),
            response.total_count
        );
        Ok(response.items)
    }
}
