//! Result entries and context actions handed to the host

use crate::error::FetchError;
use crate::search::RankedRepository;
use serde::{Deserialize, Serialize};

/// Icon selector; the host maps it to its themed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    GitHub,
    Repo,
    Fork,
}

/// Opaque data the host passes back for later actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub url: String,
}

/// One row of the launcher's result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub title: String,
    pub subtitle: String,
    pub icon: Icon,
    pub score: i32,
    /// Char offsets into `title`
    pub highlight: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<ResultPayload>,
}

impl ResultEntry {
    pub fn from_ranked(ranked: RankedRepository) -> Self {
        let RankedRepository {
            repo,
            score,
            highlight,
        } = ranked;
        Self {
            title: repo.full_name,
            subtitle: repo.description,
            icon: if repo.fork { Icon::Fork } else { Icon::Repo },
            score,
            highlight,
            payload: Some(ResultPayload { url: repo.html_url }),
        }
    }

    /// Entry shown for an empty query
    pub fn open_github(web_url: &str) -> Self {
        Self {
            title: "Open GitHub".to_string(),
            subtitle: format!("Open {} in your browser", web_url),
            icon: Icon::GitHub,
            score: 0,
            highlight: Vec::new(),
            payload: Some(ResultPayload {
                url: web_url.to_string(),
            }),
        }
    }

    /// Placeholder standing in for a failed fetch; carries no URL
    pub fn failure(err: &FetchError) -> Self {
        Self {
            title: err.title(),
            subtitle: err.message(),
            icon: match err {
                FetchError::ConfigurationMissing => Icon::GitHub,
                _ => Icon::Repo,
            },
            score: 0,
            highlight: Vec::new(),
            payload: None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.payload.as_ref().map(|p| p.url.as_str())
    }
}

/// Secondary actions on a repository entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextAction {
    /// Open the repository page; the primary action of an entry
    Open,
    CopyLink,
    OpenIssues,
    OpenPullRequests,
}

impl ContextAction {
    /// Actions offered in the context menu, in display order
    pub const MENU: [ContextAction; 3] = [
        ContextAction::CopyLink,
        ContextAction::OpenIssues,
        ContextAction::OpenPullRequests,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ContextAction::Open => "Open in browser",
            ContextAction::CopyLink => "Copy link",
            ContextAction::OpenIssues => "Open issues",
            ContextAction::OpenPullRequests => "Open pull requests",
        }
    }

    pub fn shortcut(&self) -> &'static str {
        match self {
            ContextAction::Open => "Enter",
            ContextAction::CopyLink => "Ctrl+C",
            ContextAction::OpenIssues => "Ctrl+I",
            ContextAction::OpenPullRequests => "Ctrl+P",
        }
    }

    /// URL the action operates on
    pub fn target_url(&self, repo_url: &str) -> String {
        let base = repo_url.trim_end_matches('/');
        match self {
            ContextAction::Open | ContextAction::CopyLink => base.to_string(),
            ContextAction::OpenIssues => format!("{}/issues", base),
            ContextAction::OpenPullRequests => format!("{}/pulls", base),
        }
    }

    /// Whether the action opens a browser, as opposed to handing the URL to the host
    pub fn opens_browser(&self) -> bool {
        !matches!(self, ContextAction::CopyLink)
    }
}

/// A context action resolved against a concrete repository URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMenuItem {
    pub action: ContextAction,
    pub title: &'static str,
    pub shortcut: &'static str,
    pub url: String,
}

/// Context menu for an entry's payload URL
pub fn context_menu(repo_url: &str) -> Vec<ContextMenuItem> {
    ContextAction::MENU
        .iter()
        .map(|action| ContextMenuItem {
            action: *action,
            title: action.title(),
            shortcut: action.shortcut(),
            url: action.target_url(repo_url),
        })
        .collect()
}
