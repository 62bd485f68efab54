//! Ranking of repository listings against the typed fragment
//!
//! Only the repository part of `owner/name` is matched; highlight offsets are
//! then shifted past the `owner/` prefix so they line up with the displayed
//! full name.

use super::fuzzy::FuzzyMatcher;
use crate::github::Repository;
use std::collections::HashSet;

/// A repository with its relevance for the current query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRepository {
    pub repo: Repository,
    pub score: i32,
    /// Char offsets into `repo.full_name`
    pub highlight: Vec<u32>,
}

/// Score every repository of one owner listing against `target`.
///
/// With a non-empty target, non-matching repositories are dropped. Order is
/// the listing's order; see [`merge_ranked`] for sorting.
pub fn rank_repositories(
    matcher: &mut FuzzyMatcher,
    target: &str,
    repos: &[Repository],
) -> Vec<RankedRepository> {
    repos
        .iter()
        .filter_map(|repo| {
            if !FuzzyMatcher::is_subsequence(target, repo.name()) {
                return None;
            }
            let result = matcher.fuzzy_match(target, repo.name());
            if !target.is_empty() && !result.is_match() {
                return None;
            }
            let offset = prefix_len(repo);
            Some(RankedRepository {
                repo: repo.clone(),
                score: result.score,
                highlight: result.positions.iter().map(|p| p + offset).collect(),
            })
        })
        .collect()
}

/// Merge per-owner rankings into one list: best score first, ties keep
/// listing order, duplicates (same full name) collapse to the best entry.
pub fn merge_ranked(lists: Vec<Vec<RankedRepository>>) -> Vec<RankedRepository> {
    let mut merged: Vec<RankedRepository> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.score.cmp(&a.score));

    let mut seen = HashSet::new();
    merged.retain(|r| seen.insert(r.repo.full_name.to_lowercase()));
    merged
}

/// Search results are already ordered by stars; keep that order with
/// strictly decreasing scores and no highlights.
pub fn rank_search_results(repos: Vec<Repository>) -> Vec<RankedRepository> {
    let total = repos.len() as i32;
    repos
        .into_iter()
        .enumerate()
        .map(|(i, repo)| RankedRepository {
            repo,
            score: total - i as i32,
            highlight: Vec::new(),
        })
        .collect()
}

/// Length in chars of `owner/`, or 0 for names without a separator
fn prefix_len(repo: &Repository) -> u32 {
    if repo.full_name.contains('/') {
        repo.owner().chars().count() as u32 + 1
    } else {
        0
    }
}
