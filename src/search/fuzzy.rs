//! Fuzzy Matching Engine using nucleo-matcher
//!
//! Scores a pattern against a candidate as an in-order, case-insensitive
//! subsequence. nucleo's Smith-Waterman scoring rewards contiguous runs and
//! matches at word boundaries (after `-`, `_`, `/`, whitespace, or at the
//! start) and penalises gaps; on top of that short candidates get a density
//! bonus and whole-string equality gets a fixed bonus.

use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Score given to every candidate by an empty pattern
pub const EMPTY_PATTERN_SCORE: i32 = 1;

/// Maximum bonus for a pattern that covers the whole candidate
const DENSITY_WEIGHT: i32 = 32;
/// Bonus for case-insensitive whole-string equality
const CASELESS_EQUAL_BONUS: i32 = 500;
/// Bonus for exact, case-sensitive whole-string equality
const EXACT_EQUAL_BONUS: i32 = 1000;

/// Match result with score and highlight positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Relevance; `<= 0` means the candidate does not match
    pub score: i32,
    /// Char offsets of matched characters in the candidate, ascending
    pub positions: Vec<u32>,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self {
            score: 0,
            positions: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.score > 0
    }
}

/// Fuzzy matcher; holds nucleo's scratch memory between calls
pub struct FuzzyMatcher {
    matcher: Matcher,
    haystack_buf: Vec<char>,
    needle_buf: Vec<char>,
    indices: Vec<u32>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    /// Create a new fuzzy matcher; `/` counts as a segment delimiter
    pub fn new() -> Self {
        // Both sides are lowercased per char here; nucleo must not fold
        // accents on the haystack alone
        let mut config = Config::DEFAULT.match_paths();
        config.normalize = false;
        Self {
            matcher: Matcher::new(config),
            haystack_buf: Vec::new(),
            needle_buf: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Match `pattern` against `candidate`
    pub fn fuzzy_match(&mut self, pattern: &str, candidate: &str) -> MatchResult {
        if pattern.is_empty() {
            return MatchResult {
                score: EMPTY_PATTERN_SCORE,
                positions: Vec::new(),
            };
        }

        let haystack_lower = lower_per_char(candidate);
        let needle_lower = lower_per_char(pattern);

        self.haystack_buf.clear();
        self.needle_buf.clear();
        self.indices.clear();

        let haystack = Utf32Str::new(&haystack_lower, &mut self.haystack_buf);
        let needle = Utf32Str::new(&needle_lower, &mut self.needle_buf);

        let Some(base) = self
            .matcher
            .fuzzy_indices(haystack, needle, &mut self.indices)
        else {
            return MatchResult::no_match();
        };

        let mut positions = self.indices.clone();
        positions.sort_unstable();
        positions.dedup();

        let score = i32::from(base)
            + 1
            + Self::density_bonus(positions.len(), candidate)
            + Self::equality_bonus(pattern, candidate, &haystack_lower, &needle_lower);

        MatchResult { score, positions }
    }

    /// Check for a case-insensitive subsequence match without scoring
    pub fn is_subsequence(pattern: &str, candidate: &str) -> bool {
        let mut hay = candidate.chars().map(lower_char);
        pattern
            .chars()
            .map(lower_char)
            .all(|p| hay.by_ref().any(|h| h == p))
    }

    fn density_bonus(matched: usize, candidate: &str) -> i32 {
        let len = candidate.chars().count().max(1);
        (matched.min(len) as i32 * DENSITY_WEIGHT) / len as i32
    }

    fn equality_bonus(pattern: &str, candidate: &str, hay_lower: &str, needle_lower: &str) -> i32 {
        if pattern == candidate {
            EXACT_EQUAL_BONUS
        } else if hay_lower == needle_lower {
            CASELESS_EQUAL_BONUS
        } else {
            0
        }
    }
}

/// Lowercase one char to one char so offsets stay aligned with the original
fn lower_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn lower_per_char(text: &str) -> String {
    text.chars().map(lower_char).collect()
}
