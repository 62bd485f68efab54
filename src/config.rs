//! Launcher settings
//!
//! Settings are read from `<config_dir>/ghrepo/config.json` and overlaid with
//! CLI flags. At runtime they live in a [`SettingsStore`], which hands out
//! immutable snapshots so in-flight requests keep the credentials they were
//! issued with.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WEB_URL: &str = "https://github.com";
pub const MIN_PAGE_SIZE: u32 = 30;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A GitHub user the shorthand form searches, with an optional token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Launcher settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

fn default_page_size() -> u32 {
    MIN_PAGE_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            page_size: MIN_PAGE_SIZE,
            api_url: None,
        }
    }
}

impl Settings {
    /// Pair user names with tokens by position, the way the settings panel
    /// lists them one per line. Blank lines are skipped; a missing or blank
    /// token means anonymous access for that user.
    pub fn from_lists(users: &[String], tokens: &[String]) -> Self {
        let accounts = users
            .iter()
            .enumerate()
            .filter(|(_, u)| !u.trim().is_empty())
            .map(|(i, u)| Account {
                username: u.trim().to_string(),
                token: tokens
                    .get(i)
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            })
            .collect();

        Self {
            accounts,
            ..Self::default()
        }
    }

    /// Configured default users, in order
    pub fn default_users(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.username.clone()).collect()
    }

    /// Token configured for `user` (case-insensitive)
    pub fn credential_for(&self, user: &str) -> Option<String> {
        self.accounts
            .iter()
            .find(|a| a.username.eq_ignore_ascii_case(user))
            .and_then(|a| a.token.clone())
    }

    /// Token used for requests not tied to a configured user
    pub fn any_credential(&self) -> Option<String> {
        self.accounts.iter().find_map(|a| a.token.clone())
    }

    /// Page size clamped to what the API accepts
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// API base URL without trailing slash, falling back to the public API
    pub fn effective_api_url(&self) -> String {
        match self.api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => DEFAULT_API_URL.to_string(),
        }
    }

    /// Web root that repositories and the empty-query entry point to.
    ///
    /// GitHub Enterprise serves its API under `/api/v3` on the web host.
    pub fn web_url(&self) -> String {
        let api = self.effective_api_url();
        if api == DEFAULT_API_URL {
            return DEFAULT_WEB_URL.to_string();
        }
        match Url::parse(&api) {
            Ok(mut url) => {
                let path = url.path().trim_end_matches('/').to_string();
                let web_path = path.strip_suffix("/api/v3").unwrap_or(&path).to_string();
                url.set_path(&web_path);
                url.set_query(None);
                url.as_str().trim_end_matches('/').to_string()
            }
            Err(_) => DEFAULT_WEB_URL.to_string(),
        }
    }

    /// Overlay `other` on top of `self`; only values present in `other` win
    pub fn merge(mut self, other: SettingsOverride) -> Self {
        if !other.accounts.is_empty() {
            self.accounts = other.accounts;
        }
        if let Some(size) = other.page_size {
            self.page_size = size;
        }
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        self
    }
}

/// Partial settings from CLI flags and environment, laid over the config file.
/// The host's `settings` call sends a complete [`Settings`] instead.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverride {
    pub accounts: Vec<Account>,
    pub page_size: Option<u32>,
    pub api_url: Option<String>,
}

/// Shared, read-mostly settings with atomic snapshot replacement
pub struct SettingsStore {
    current: RwLock<Arc<Settings>>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: RwLock::new(Arc::new(settings)),
        }
    }

    /// Snapshot of the current settings
    pub fn snapshot(&self) -> Arc<Settings> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the settings; readers holding an older snapshot are unaffected
    pub fn replace(&self, settings: Settings) {
        info!(
            "Settings updated: {} account(s), page size {}, API {}",
            settings.accounts.len(),
            settings.effective_page_size(),
            settings.effective_api_url()
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(settings);
    }
}

/// Get the path to the settings file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Cannot determine config directory")?;
    Ok(config_dir.join("ghrepo").join("config.json"))
}

/// Load settings from the default location
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&config_path()?)
}

/// Load settings from `path`; a missing file yields the defaults
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let settings: Settings = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    Ok(settings)
}
