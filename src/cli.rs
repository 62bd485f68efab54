//! CLI mode implementation
//!
//! Runs single launcher queries from the command line; with no subcommand
//! the binary serves the host protocol on stdio instead.

use crate::config::{Settings, SettingsOverride};
use crate::results::ContextAction;
use clap::{Args, Parser, Subcommand};

/// ghrepo CLI
#[derive(Parser, Debug)]
#[command(name = "ghrepo")]
#[command(about = "Find GitHub repositories and open them in the browser", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up repositories: `owner/name` or `/name` for the default users
    Query(QueryArgs),
    /// Search all of GitHub
    Search(SearchArgs),
    /// List the context actions of a repository URL
    Actions(ActionsArgs),
    /// Open a repository, its issues or its pull requests
    Open(OpenArgs),
}

/// Settings given on the command line or in the environment; these win over
/// the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Default GitHub user(s), comma separated
    #[arg(long = "user", env = "GHREPO_USER", value_delimiter = ',', global = true)]
    pub users: Vec<String>,

    /// Personal access token(s), paired with --user by position
    #[arg(
        long = "token",
        env = "GHREPO_TOKEN",
        value_delimiter = ',',
        global = true,
        hide_env_values = true
    )]
    pub tokens: Vec<String>,

    /// Results requested per page (30-100)
    #[arg(long, env = "GHREPO_PAGE_SIZE", global = true)]
    pub page_size: Option<u32>,

    /// API base URL, for GitHub Enterprise Server
    #[arg(long, env = "GHREPO_API_URL", global = true)]
    pub api_url: Option<String>,
}

impl ConfigArgs {
    pub fn to_override(&self) -> SettingsOverride {
        SettingsOverride {
            accounts: Settings::from_lists(&self.users, &self.tokens).accounts,
            page_size: self.page_size,
            api_url: self.api_url.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Launcher input, e.g. `torvalds/linux` or `/dotfiles`
    #[arg(allow_hyphen_values = true)]
    pub input: String,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search terms
    pub query: String,

    /// Restrict results to a language
    #[arg(short = 'l', long)]
    pub language: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ActionsArgs {
    /// Repository URL
    pub url: String,
}

#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Repository URL
    pub url: String,

    /// Open the issues page
    #[arg(long, conflicts_with = "pulls")]
    pub issues: bool,

    /// Open the pull requests page
    #[arg(long)]
    pub pulls: bool,
}

impl OpenArgs {
    pub fn action(&self) -> ContextAction {
        if self.issues {
            ContextAction::OpenIssues
        } else if self.pulls {
            ContextAction::OpenPullRequests
        } else {
            ContextAction::Open
        }
    }
}
