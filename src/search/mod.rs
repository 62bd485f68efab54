//! Fuzzy matching and ranking of repository names

pub mod fuzzy;
pub mod ranking;


pub use fuzzy::{FuzzyMatcher, MatchResult};
pub use ranking::{merge_ranked, rank_repositories, rank_search_results, RankedRepository};
