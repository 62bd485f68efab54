//! Error types for ghrepo
//!
//! `FetchError` is the uniform failure of everything that talks to the
//! repository source. `AppError` covers the binary's own edges (config files,
//! CLI input, stdio).

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure of a repository fetch, or of planning one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network failure: {0}")]
    Network(String),
    #[error("HTTP {code}: {message}")]
    HttpStatus { code: u16, message: String },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("No default user configured")]
    ConfigurationMissing,
    #[error("Invalid user name: {0}")]
    InvalidUser(String),
}

impl FetchError {
    /// Short label of the error kind, used as a placeholder title
    pub fn title(&self) -> String {
        match self {
            FetchError::Network(_) => "Network failure".to_string(),
            FetchError::HttpStatus { code, .. } => format!("GitHub returned HTTP {}", code),
            FetchError::Decode(_) => "Unexpected response from GitHub".to_string(),
            FetchError::Cancelled => "Request cancelled".to_string(),
            FetchError::ConfigurationMissing => "Default user is not set".to_string(),
            FetchError::InvalidUser(_) => "Invalid user name".to_string(),
        }
    }

    /// Human readable detail, used as a placeholder subtitle
    pub fn message(&self) -> String {
        match self {
            FetchError::Network(msg) | FetchError::Decode(msg) => msg.clone(),
            FetchError::HttpStatus { message, .. } => message.clone(),
            FetchError::Cancelled => String::new(),
            FetchError::InvalidUser(user) => format!("'{}' cannot be a GitHub login", user),
            FetchError::ConfigurationMissing => {
                "Configure a default user to use the /repo shorthand".to_string()
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus {
                code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// Application error types
#[derive(Debug, Serialize)]
pub enum AppError {
    InvalidInput(String),
    ConfigError(String),
    NotFound(String),
    Fetch(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Fetch(msg) => write!(f, "Fetch failed: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Get the error code for host protocol responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::ConfigError(_) => "config_error",
            AppError::NotFound(_) => "not_found",
            AppError::Fetch(_) => "fetch_failed",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::ConfigurationMissing => AppError::ConfigError(err.message()),
            FetchError::HttpStatus { code: 404, message } => AppError::NotFound(message),
            FetchError::InvalidUser(_) => AppError::InvalidInput(err.message()),
            other => AppError::Fetch(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Reject input that cannot be a login before it is put into a request path.
///
/// Enterprise managed users carry a `_shortcode` suffix, so underscores are
/// allowed and there is no length cap; the server has the final word.
pub fn validate_username(user: &str) -> Result<(), FetchError> {
    let valid = !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(FetchError::InvalidUser(user.to_string()))
    }
}
