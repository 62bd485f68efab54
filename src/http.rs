//! HTTP client utilities
//!
//! Provides a reqwest::Client preconfigured for the GitHub REST API.
//! reqwest honours HTTP_PROXY / HTTPS_PROXY / NO_PROXY on its own.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::time::Duration;

/// API version pinned for every request
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Build a reqwest Client with the given timeout and the GitHub default headers
pub fn github_client(timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "x-github-api-version",
        HeaderValue::from_static(GITHUB_API_VERSION),
    );

    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .default_headers(headers)
        .user_agent(concat!("ghrepo/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Authorization header value for a personal access token
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(github_client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_bearer_trims_token() {
        assert_eq!(bearer(" ghp_abc \n"), "Bearer ghp_abc");
    }
}
