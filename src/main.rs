//! ghrepo: GitHub repository launcher (Rust)
//!
//! Dual-mode application:
//! - Host Mode (default): JSON-RPC over stdio for a desktop launcher UI
//! - CLI Mode: one-shot queries from the command line
//!
//! Launcher input forms:
//! - `owner/name` - repositories of `owner` fuzzy-matched against `name`
//! - `/name` - the same over the configured default users
//! - anything else - GitHub-wide search, run once typing pauses

mod cache;
mod cli;
mod config;
mod coordinator;
mod error;
mod github;
mod host;
mod http;
mod launcher;
mod planner;
mod results;
mod search;

#[cfg(test)]
mod tests_launcher;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigArgs};
use error::AppError;
use github::{GitHubClient, SearchOptions};
use launcher::{perform_action, ActionOutcome, Launcher};
use results::{context_menu, ResultEntry};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Upper bound on a single CLI request
const CLI_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let launcher = match build_launcher(&cli.config) {
        Ok(launcher) => Arc::new(launcher),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(get_exit_code(&e));
        }
    };

    match cli.command {
        Some(command) => run_cli_mode(command, cli.json, &launcher).await,
        None => run_host_mode(launcher).await,
    }
}

/// Logs go to stderr; stdout belongs to the host protocol or CLI output
fn init_logging(cli: &Cli) {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file overlaid with flags and environment
fn build_launcher(args: &ConfigArgs) -> Result<Launcher> {
    let settings = config::load_settings()?.merge(args.to_override());
    let client = GitHubClient::new()?;
    Ok(Launcher::new(Arc::new(client), settings))
}

/// Run in CLI mode
async fn run_cli_mode(command: Commands, json: bool, launcher: &Launcher) -> Result<()> {
    let result = match command {
        Commands::Query(args) => execute_query_cli(launcher, &args.input, json).await,
        Commands::Search(args) => {
            let options = SearchOptions {
                language: args.language,
            };
            execute_search_cli(launcher, &args.query, &options, json).await
        }
        Commands::Actions(args) => execute_actions_cli(&args.url, json),
        Commands::Open(args) => execute_open_cli(&args.url, args.action()),
    };

    // Handle result and exit with appropriate code
    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

async fn execute_query_cli(launcher: &Launcher, input: &str, json: bool) -> Result<String> {
    match timeout(CLI_TIMEOUT, launcher.query(input)).await {
        Ok(Some(entries)) => render_entries(&entries, json),
        Ok(None) => Err(AppError::Fetch("Request cancelled".to_string()).into()),
        Err(_) => Err(anyhow::anyhow!(
            "Request exceeded {} second timeout",
            CLI_TIMEOUT.as_secs()
        )),
    }
}

async fn execute_search_cli(
    launcher: &Launcher,
    query: &str,
    options: &SearchOptions,
    json: bool,
) -> Result<String> {
    if query.contains('/') {
        return Err(AppError::InvalidInput(format!(
            "'{}' looks like a repository lookup; use `ghrepo query`",
            query
        ))
        .into());
    }

    match timeout(CLI_TIMEOUT, launcher.query_delayed(query, options)).await {
        Ok(Some(entries)) => render_entries(&entries, json),
        Ok(None) => Err(AppError::Fetch("Request cancelled".to_string()).into()),
        Err(_) => Err(anyhow::anyhow!(
            "Request exceeded {} second timeout",
            CLI_TIMEOUT.as_secs()
        )),
    }
}

fn execute_actions_cli(url: &str, json: bool) -> Result<String> {
    let menu = context_menu(url);
    if json {
        return Ok(serde_json::to_string_pretty(&menu)?);
    }
    Ok(menu
        .iter()
        .map(|item| format!("{:<8} {:<20} {}", item.shortcut, item.title, item.url))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn execute_open_cli(url: &str, action: results::ContextAction) -> Result<String> {
    match perform_action(action, url)? {
        ActionOutcome::Opened(url) => Ok(format!("Opened {}", url)),
        ActionOutcome::CopyToClipboard(url) => Ok(url),
    }
}

/// Plain listing, or JSON with `--json`.
///
/// A result made only of failure placeholders is reported as an error so
/// scripts see a non-zero exit code.
fn render_entries(entries: &[ResultEntry], json: bool) -> Result<String> {
    if !entries.is_empty() && entries.iter().all(|e| e.url().is_none()) {
        let first = &entries[0];
        let err = if first.title == error::FetchError::ConfigurationMissing.title() {
            AppError::ConfigError(first.subtitle.clone())
        } else if first.title == error::FetchError::InvalidUser(String::new()).title() {
            AppError::InvalidInput(first.subtitle.clone())
        } else if first.title.ends_with("HTTP 404") {
            AppError::NotFound(first.subtitle.clone())
        } else {
            AppError::Fetch(format!("{}: {}", first.title, first.subtitle))
        };
        return Err(err.into());
    }

    if json {
        return Ok(serde_json::to_string_pretty(entries)?);
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.title);
        if !entry.subtitle.is_empty() {
            output.push_str(&format!(" - {}", entry.subtitle));
        }
        if let Some(url) = entry.url() {
            output.push_str(&format!("\n    {}", url));
        }
        output.push('\n');
    }
    Ok(output.trim_end().to_string())
}

/// Map errors to exit codes
fn get_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(app) = err.downcast_ref::<AppError>() {
        return match app {
            AppError::InvalidInput(_) | AppError::ConfigError(_) => 1,
            AppError::Fetch(_) => 2,
            AppError::NotFound(_) => 3,
            AppError::Internal(_) => 5,
        };
    }

    let err_str = err.to_string().to_lowercase();
    if err_str.contains("invalid") || err_str.contains("usage") {
        1 // Invalid arguments or usage error
    } else if err_str.contains("network") || err_str.contains("connection") {
        2 // Network or API error
    } else if err_str.contains("not found") {
        3 // Not found error
    } else if err_str.contains("timeout") {
        4 // Timeout error
    } else {
        5 // Other application errors
    }
}

/// Run in host mode
async fn run_host_mode(launcher: Arc<Launcher>) -> Result<()> {
    info!("Starting ghrepo host");
    host::handle_stdio(launcher).await
}
