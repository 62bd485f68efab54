//! GitHub REST wire types

use serde::{Deserialize, Deserializer, Serialize};

/// A repository as returned by the list and search endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    pub full_name: String,
    pub html_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub fork: bool,
}

impl Repository {
    pub fn new(
        full_name: impl Into<String>,
        html_url: impl Into<String>,
        description: impl Into<String>,
        fork: bool,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            html_url: html_url.into(),
            description: description.into(),
            fork,
        }
    }

    /// Owner segment of `owner/name`
    pub fn owner(&self) -> &str {
        match self.full_name.split_once('/') {
            Some((owner, _)) => owner,
            None => "",
        }
    }

    /// Name segment of `owner/name`; the whole string when there is no separator
    pub fn name(&self) -> &str {
        match self.full_name.split_once('/') {
            Some((_, name)) => name,
            None => &self.full_name,
        }
    }
}

/// Envelope of `/search/repositories`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    pub items: Vec<Repository>,
}

/// Error body GitHub attaches to non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
