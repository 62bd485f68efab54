//! The launcher service
//!
//! Owns the settings, the repository source, the listing cache and the
//! request coordinator, and turns raw launcher input into result entries.
//! Every outcome is a list the host can render; `None` means the query was
//! superseded and its response should be dropped.

use crate::cache::{KeyedCache, CACHE_TTL};
use crate::config::{Settings, SettingsStore};
use crate::coordinator::{RequestCoordinator, Stream};
use crate::error::{AppError, FetchError};
use crate::github::{FetchParams, FetchResult, Repository, RepositorySource, SearchOptions};
use crate::planner::{plan, QueryIntent};
use crate::results::{ContextAction, ResultEntry};
use crate::search::{merge_ranked, rank_repositories, rank_search_results, FuzzyMatcher};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub struct Launcher {
    settings: SettingsStore,
    source: Arc<dyn RepositorySource>,
    cache: KeyedCache<Vec<Repository>>,
    coordinator: RequestCoordinator,
}

impl Launcher {
    pub fn new(source: Arc<dyn RepositorySource>, settings: Settings) -> Self {
        Self::with_cache_ttl(source, settings, CACHE_TTL)
    }

    pub fn with_cache_ttl(
        source: Arc<dyn RepositorySource>,
        settings: Settings,
        ttl: Duration,
    ) -> Self {
        Self {
            settings: SettingsStore::new(settings),
            source,
            cache: KeyedCache::new(ttl),
            coordinator: RequestCoordinator::new(),
        }
    }

    /// Current settings snapshot
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.snapshot()
    }

    /// Replace the settings; requests already issued keep their snapshot
    pub fn update_settings(&self, settings: Settings) {
        self.settings.replace(settings);
    }

    /// The host signalled that the user moved on
    pub fn cancel(&self, stream: Stream) {
        self.coordinator.cancel(stream);
    }

    /// Immediate query path, run on every keystroke.
    ///
    /// Free-text input yields nothing here; the host runs
    /// [`Launcher::query_delayed`] for it once typing pauses.
    pub async fn query(&self, raw: &str) -> Option<Vec<ResultEntry>> {
        let snapshot = self.settings.snapshot();

        let intent = match plan(raw, &snapshot.default_users()) {
            Ok(intent) => intent,
            Err(err) => {
                debug!("Query '{}' not runnable: {}", raw, err);
                return Some(vec![ResultEntry::failure(&err)]);
            }
        };

        match intent {
            QueryIntent::Empty => Some(vec![ResultEntry::open_github(&snapshot.web_url())]),
            QueryIntent::FullTextSearch(_) => Some(Vec::new()),
            QueryIntent::DefaultUserShorthand(target) => {
                self.browse(&snapshot.default_users(), &target, &snapshot).await
            }
            QueryIntent::ExplicitUserRepo { user, target } => {
                self.browse(&[user], &target, &snapshot).await
            }
        }
    }

    /// Debounced query path: GitHub-wide search for free-text input
    pub async fn query_delayed(
        &self,
        raw: &str,
        options: &SearchOptions,
    ) -> Option<Vec<ResultEntry>> {
        let snapshot = self.settings.snapshot();
        match plan(raw, &snapshot.default_users()) {
            Ok(QueryIntent::FullTextSearch(query)) => self.search(&query, options, &snapshot).await,
            _ => Some(Vec::new()),
        }
    }

    /// Repositories of `users`, matched against `target`, merged and ranked
    async fn browse(
        &self,
        users: &[String],
        target: &str,
        snapshot: &Settings,
    ) -> Option<Vec<ResultEntry>> {
        let outcome = self
            .coordinator
            .issue(
                Stream::Browse,
                move || async move {
                    let fetches = users.iter().map(|user| self.fetch_user(user, snapshot));
                    Ok(join_all(fetches).await)
                },
                true,
            )
            .await;

        let per_user: Vec<FetchResult> = match outcome {
            Ok(results) => results,
            Err(_) => return None,
        };

        let mut matcher = FuzzyMatcher::new();
        let mut lists = Vec::with_capacity(users.len());
        let mut failures = Vec::new();

        for (user, result) in users.iter().zip(per_user) {
            match result {
                Ok(repos) => lists.push(rank_repositories(&mut matcher, target, &repos)),
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    warn!("Listing repositories of {} failed: {}", user, err);
                    failures.push(ResultEntry::failure(&err));
                }
            }
        }

        let mut entries: Vec<ResultEntry> = merge_ranked(lists)
            .into_iter()
            .map(ResultEntry::from_ranked)
            .collect();
        debug!(
            "Browse '{}' over {} user(s): {} match(es)",
            target,
            users.len(),
            entries.len()
        );
        entries.extend(failures);
        Some(entries)
    }

    /// One user's listing, through the cache
    async fn fetch_user(&self, user: &str, snapshot: &Settings) -> FetchResult {
        let params = FetchParams {
            api_url: snapshot.effective_api_url(),
            page_size: snapshot.effective_page_size(),
            credential: snapshot.credential_for(user),
        };
        self.cache
            .get_or_fetch(user, || self.source.fetch_user_repositories(user, &params))
            .await
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
        snapshot: &Settings,
    ) -> Option<Vec<ResultEntry>> {
        let params = FetchParams {
            api_url: snapshot.effective_api_url(),
            page_size: snapshot.effective_page_size(),
            credential: snapshot.any_credential(),
        };

        let outcome = self
            .coordinator
            .issue(
                Stream::Search,
                || self.source.fetch_search_repositories(query, options, &params),
                true,
            )
            .await;

        match outcome {
            Ok(repos) => Some(
                rank_search_results(repos)
                    .into_iter()
                    .map(ResultEntry::from_ranked)
                    .collect(),
            ),
            Err(FetchError::Cancelled) => None,
            Err(err) => {
                warn!("Search '{}' failed: {}", query, err);
                Some(vec![ResultEntry::failure(&err)])
            }
        }
    }
}

/// What performing an action produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A browser was asked to open this URL
    Opened(String),
    /// The host should put this URL on the clipboard
    CopyToClipboard(String),
}

/// Perform `action` on a repository URL taken from an entry's payload
pub fn perform_action(action: ContextAction, repo_url: &str) -> Result<ActionOutcome, AppError> {
    let parsed = Url::parse(repo_url)
        .map_err(|e| AppError::InvalidInput(format!("'{}' is not a URL: {}", repo_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::InvalidInput(format!(
            "Refusing to open non-web URL '{}'",
            repo_url
        )));
    }

    let target = action.target_url(repo_url);
    if !action.opens_browser() {
        return Ok(ActionOutcome::CopyToClipboard(target));
    }

    webbrowser::open(&target)?;
    info!("Opened {} in browser", target);
    Ok(ActionOutcome::Opened(target))
}
