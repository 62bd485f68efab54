//! Launcher scenarios against an in-memory repository source

use crate::config::{Account, Settings};
use crate::coordinator::Stream;
use crate::error::FetchError;
use crate::github::{FetchParams, FetchResult, Repository, RepositorySource, SearchOptions};
use crate::launcher::Launcher;
use crate::results::Icon;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted source that records every call it receives
#[derive(Default)]
pub struct FakeSource {
    users: Mutex<HashMap<String, FetchResult>>,
    delays: Mutex<HashMap<String, Duration>>,
    search_results: Mutex<Vec<Repository>>,
    search_delay: Mutex<Option<Duration>>,
    user_calls: AtomicUsize,
    search_calls: AtomicUsize,
    credentials: Mutex<Vec<Option<String>>>,
    queries: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: &str, repos: Vec<Repository>) -> Self {
        self.set_user(user, Ok(repos));
        self
    }

    pub fn with_failure(self, user: &str, err: FetchError) -> Self {
        self.set_user(user, Err(err));
        self
    }

    pub fn with_delay(self, user: &str, delay: Duration) -> Self {
        self.set_delay(user, delay);
        self
    }

    pub fn with_search(self, repos: Vec<Repository>, delay: Duration) -> Self {
        *self.search_results.lock().unwrap() = repos;
        *self.search_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn set_user(&self, user: &str, result: FetchResult) {
        self.users.lock().unwrap().insert(user.to_lowercase(), result);
    }

    pub fn set_delay(&self, user: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(user.to_lowercase(), delay);
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn credentials(&self) -> Vec<Option<String>> {
        self.credentials.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<(String, Option<String>)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositorySource for FakeSource {
    async fn fetch_user_repositories(&self, user: &str, params: &FetchParams) -> FetchResult {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.credentials.lock().unwrap().push(params.credential.clone());

        // Respond with what was configured when the request arrived
        let key = user.to_lowercase();
        let result = self.users.lock().unwrap().get(&key).cloned().unwrap_or_else(|| {
            Err(FetchError::HttpStatus {
                code: 404,
                message: "Not Found".to_string(),
            })
        });
        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn fetch_search_repositories(
        &self,
        query: &str,
        options: &SearchOptions,
        _params: &FetchParams,
    ) -> FetchResult {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), options.language.clone()));
        let results = self.search_results.lock().unwrap().clone();
        let delay = *self.search_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(results)
    }
}

fn repo(full_name: &str) -> Repository {
    Repository::new(
        full_name,
        &format!("https://github.com/{}", full_name),
        "",
        false,
    )
}

fn settings_for(users: &[(&str, Option<&str>)]) -> Settings {
    Settings {
        accounts: users
            .iter()
            .map(|(name, token)| Account {
                username: name.to_string(),
                token: token.map(str::to_string),
            })
            .collect(),
        ..Settings::default()
    }
}

fn octocat_repos() -> Vec<Repository> {
    vec![
        Repository::new(
            "octocat/Spoon-Knife",
            "https://github.com/octocat/Spoon-Knife",
            "This repo is for demonstration purposes only.",
            false,
        ),
        repo("octocat/Hello-World"),
        repo("octocat/octocat.github.io"),
    ]
}

fn titles(entries: &[crate::results::ResultEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.title.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_shorthand_matches_default_user_repos() {
    let source = Arc::new(FakeSource::new().with_user("octocat", octocat_repos()));
    let launcher = Launcher::new(source.clone(), settings_for(&[("octocat", None)]));

    let entries = launcher.query("/Spo").await.expect("not superseded");
    assert_eq!(titles(&entries), vec!["octocat/Spoon-Knife"]);
    assert_eq!(entries[0].highlight, vec![8, 9, 10]);
    assert_eq!(entries[0].url(), Some("https://github.com/octocat/Spoon-Knife"));
    assert_eq!(entries[0].icon, Icon::Repo);
    assert_eq!(source.user_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_user_issues_one_fetch() {
    let source = Arc::new(FakeSource::new().with_user(
        "torvalds",
        vec![repo("torvalds/linux"), repo("torvalds/subsurface-for-dirk")],
    ));
    let launcher = Launcher::new(source.clone(), Settings::default());

    let entries = launcher.query("torvalds/linux").await.expect("not superseded");
    assert_eq!(entries[0].title, "torvalds/linux");
    assert_eq!(entries[0].highlight, vec![9, 10, 11, 12, 13]);
    assert_eq!(source.user_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_target_lists_everything() {
    let source = Arc::new(FakeSource::new().with_user("octocat", octocat_repos()));
    let launcher = Launcher::new(source, settings_for(&[("octocat", None)]));

    let entries = launcher.query("/").await.expect("not superseded");
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.highlight.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_within_ttl_and_refetch_after() {
    let source = Arc::new(FakeSource::new().with_user("octocat", octocat_repos()));
    let launcher = Launcher::new(source.clone(), settings_for(&[("octocat", None)]));

    launcher.query("/s").await.expect("not superseded");
    tokio::time::advance(Duration::from_secs(30)).await;
    launcher.query("/spoon").await.expect("not superseded");
    launcher.query("octocat/hello").await.expect("not superseded");
    assert_eq!(source.user_calls(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    launcher.query("/spoon").await.expect("not superseded");
    assert_eq!(source.user_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_multiple_default_users_are_merged() {
    let source = Arc::new(
        FakeSource::new()
            .with_user("alice", vec![repo("alice/widget")])
            .with_user("bob-smith", vec![repo("bob-smith/widgets"), repo("bob-smith/other")]),
    );
    let launcher = Launcher::new(
        source.clone(),
        settings_for(&[("alice", None), ("bob-smith", None)]),
    );

    let entries = launcher.query("/wid").await.expect("not superseded");
    assert_eq!(entries.len(), 2);
    assert_eq!(source.user_calls(), 2);

    let alice = entries.iter().find(|e| e.title == "alice/widget").expect("alice entry");
    let bob = entries
        .iter()
        .find(|e| e.title == "bob-smith/widgets")
        .expect("bob entry");
    assert_eq!(alice.highlight, vec![6, 7, 8]);
    assert_eq!(bob.highlight, vec![10, 11, 12]);
    assert!(entries[0].score >= entries[1].score);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_default_users_fetch_once() {
    let source = Arc::new(FakeSource::new().with_user("octocat", octocat_repos()));
    let launcher = Launcher::new(
        source.clone(),
        settings_for(&[("octocat", None), ("Octocat", None)]),
    );

    let entries = launcher.query("/spoon").await.expect("not superseded");
    assert_eq!(titles(&entries), vec!["octocat/Spoon-Knife"]);
    assert_eq!(source.user_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shorthand_without_default_user_makes_no_request() {
    let source = Arc::new(FakeSource::new());
    let launcher = Launcher::new(source.clone(), Settings::default());

    let entries = launcher.query("/foo").await.expect("not superseded");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Default user is not set");
    assert_eq!(entries[0].url(), None);
    assert_eq!(source.user_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_user_yields_placeholder() {
    let source = Arc::new(
        FakeSource::new()
            .with_user("alice", vec![repo("alice/tool")])
            .with_failure("bob", FetchError::Network("connection reset".into())),
    );
    let launcher = Launcher::new(source.clone(), settings_for(&[("alice", None), ("bob", None)]));

    let entries = launcher.query("/tool").await.expect("not superseded");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title, "alice/tool");
    assert_eq!(entries[1].title, "Network failure");
    assert_eq!(entries[1].subtitle, "connection reset");
    assert_eq!(entries[1].url(), None);

    // The failure was not cached
    launcher.query("/tool").await.expect("not superseded");
    assert_eq!(source.user_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_user_yields_placeholder() {
    let source = Arc::new(FakeSource::new());
    let launcher = Launcher::new(source, Settings::default());

    let entries = launcher.query("nobody-here/x").await.expect("not superseded");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].title.contains("404"));
    assert_eq!(entries[0].url(), None);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_query_is_dropped_and_not_cached() {
    let source = Arc::new(
        FakeSource::new()
            .with_user("alice", vec![repo("alice/stale")])
            .with_delay("alice", Duration::from_millis(100)),
    );
    let launcher = Arc::new(Launcher::new(source.clone(), Settings::default()));

    let first = {
        let launcher = launcher.clone();
        tokio::spawn(async move { launcher.query("alice/").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    source.set_user("alice", Ok(vec![repo("alice/fresh")]));
    source.set_delay("alice", Duration::ZERO);
    let second = launcher.query("alice/").await.expect("latest query delivered");
    assert_eq!(titles(&second), vec!["alice/fresh"]);
    assert_eq!(first.await.unwrap(), None);

    // The abandoned fetch never landed in the cache
    tokio::time::sleep(Duration::from_millis(200)).await;
    let third = launcher.query("alice/").await.expect("not superseded");
    assert_eq!(titles(&third), vec!["alice/fresh"]);
    assert_eq!(source.user_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_cancel_drops_browse() {
    let source = Arc::new(
        FakeSource::new()
            .with_user("alice", vec![repo("alice/tool")])
            .with_delay("alice", Duration::from_secs(5)),
    );
    let launcher = Arc::new(Launcher::new(source, Settings::default()));

    let pending = {
        let launcher = launcher.clone();
        tokio::spawn(async move { launcher.query("alice/tool").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    launcher.cancel(Stream::Browse);
    assert_eq!(pending.await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_settings_snapshot_applies_to_in_flight_request() {
    let source = Arc::new(
        FakeSource::new()
            .with_user("alice", vec![repo("alice/private-tool")])
            .with_delay("alice", Duration::from_millis(100)),
    );
    let launcher = Arc::new(Launcher::new(
        source.clone(),
        settings_for(&[("alice", Some("old-token"))]),
    ));

    let pending = {
        let launcher = launcher.clone();
        tokio::spawn(async move { launcher.query("/tool").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    launcher.update_settings(settings_for(&[("alice", Some("new-token"))]));

    let entries = pending.await.unwrap().expect("not superseded");
    assert_eq!(titles(&entries), vec!["alice/private-tool"]);
    assert_eq!(source.credentials(), vec![Some("old-token".to_string())]);
    assert_eq!(launcher.settings().credential_for("alice").as_deref(), Some("new-token"));
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_offers_open_github() {
    let launcher = Launcher::new(Arc::new(FakeSource::new()), Settings::default());
    let entries = launcher.query("  ").await.expect("not superseded");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].icon, Icon::GitHub);
    assert_eq!(entries[0].url(), Some("https://github.com"));

    launcher.update_settings(Settings {
        api_url: Some("https://ghe.example.com/api/v3".to_string()),
        ..Settings::default()
    });
    let entries = launcher.query("").await.expect("not superseded");
    assert_eq!(entries[0].url(), Some("https://ghe.example.com"));
}

#[tokio::test(start_paused = true)]
async fn test_full_text_only_runs_on_delayed_path() {
    let source = Arc::new(FakeSource::new().with_search(
        vec![repo("rust-lang/rust"), repo("rust-lang/cargo"), repo("rust-lang/rustlings")],
        Duration::from_millis(20),
    ));
    let launcher = Launcher::new(source.clone(), settings_for(&[("octocat", None)]));

    let immediate = launcher.query("rust").await.expect("not superseded");
    assert!(immediate.is_empty());
    assert_eq!(source.search_calls(), 0);

    let options = SearchOptions {
        language: Some("Rust".to_string()),
    };
    let delayed = launcher.query_delayed("rust", &options).await.expect("not superseded");
    assert_eq!(
        titles(&delayed),
        vec!["rust-lang/rust", "rust-lang/cargo", "rust-lang/rustlings"]
    );
    assert!(delayed.windows(2).all(|w| w[0].score > w[1].score));
    assert_eq!(source.queries(), vec![("rust".to_string(), Some("Rust".to_string()))]);

    // Search results are not cached
    launcher.query_delayed("rust", &options).await.expect("not superseded");
    assert_eq!(source.search_calls(), 2);

    // The delayed path ignores repository lookups
    let none = launcher
        .query_delayed("octocat/spoon", &SearchOptions::default())
        .await
        .expect("not superseded");
    assert!(none.is_empty());
    assert_eq!(source.user_calls(), 0);

    // Without a default user only the immediate path explains the shorthand
    let unconfigured = Launcher::new(source.clone(), Settings::default());
    let shorthand = unconfigured
        .query_delayed("/foo", &SearchOptions::default())
        .await
        .expect("not superseded");
    assert!(shorthand.is_empty());
    assert_eq!(source.search_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_newer_search_supersedes_older() {
    let source = Arc::new(
        FakeSource::new().with_search(vec![repo("a/b")], Duration::from_millis(100)),
    );
    let launcher = Arc::new(Launcher::new(source, Settings::default()));

    let first = {
        let launcher = launcher.clone();
        tokio::spawn(async move { launcher.query_delayed("foo", &SearchOptions::default()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = launcher.query_delayed("foob", &SearchOptions::default()).await;

    assert!(second.is_some());
    assert_eq!(first.await.unwrap(), None);
}
