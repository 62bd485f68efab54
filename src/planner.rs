//! Interpretation of raw launcher input

use crate::error::FetchError;

/// What the user is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    /// Nothing typed yet
    Empty,
    /// `/fragment`: repositories of the configured default users
    DefaultUserShorthand(String),
    /// `user/fragment`: repositories of `user`
    ExplicitUserRepo { user: String, target: String },
    /// Anything without a `/`: GitHub-wide search, run after the host's debounce
    FullTextSearch(String),
}

impl QueryIntent {
    /// Fragment matched against repository names, if this intent lists repositories
    #[allow(dead_code)]
    pub fn target(&self) -> Option<&str> {
        match self {
            QueryIntent::DefaultUserShorthand(target)
            | QueryIntent::ExplicitUserRepo { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Decide what `raw` asks for.
///
/// The shorthand form with no default user configured is reported as
/// `ConfigurationMissing` so no fetch is attempted.
pub fn plan(raw: &str, default_users: &[String]) -> Result<QueryIntent, FetchError> {
    let input = raw.trim();

    if input.is_empty() {
        return Ok(QueryIntent::Empty);
    }

    if let Some(target) = input.strip_prefix('/') {
        if default_users.is_empty() {
            return Err(FetchError::ConfigurationMissing);
        }
        return Ok(QueryIntent::DefaultUserShorthand(target.to_string()));
    }

    match input.split_once('/') {
        Some((user, target)) => Ok(QueryIntent::ExplicitUserRepo {
            user: user.trim().to_string(),
            target: target.to_string(),
        }),
        None => Ok(QueryIntent::FullTextSearch(input.to_string())),
    }
}
