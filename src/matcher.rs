//! Subsequence matching and ranking of candidates

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::{Candidate, MAX_QUERY_LENGTH, Match, MatchKind};

/// Character comparison policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
    /// Compare lowercased characters
    #[default]
    Insensitive,
    /// Compare characters exactly
    Sensitive,
}

/// Filters and orders candidates against a query
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    /// Character comparison policy
    case: CaseMode,
}

/// Check if `query` is a subsequence of `name`, ignoring case
///
/// An empty query matches every name.
#[must_use]
pub fn matches(query: &str, name: &str) -> bool {
    Matcher::default().is_match(query, name)
}

/// Validate a query before matching
///
/// # Errors
/// Returns error if the query is longer than `MAX_QUERY_LENGTH` characters or
/// contains a NUL character.
pub fn validate_query(query: &str) -> Result<()> {
    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(Error::query("Query too long"));
    }
    if query.contains('\0') {
        return Err(Error::query("Query contains invalid characters"));
    }
    Ok(())
}

impl Matcher {
    /// Create a matcher with the given case policy
    #[must_use]
    pub const fn new(case: CaseMode) -> Self {
        Self { case }
    }

    /// The case policy in use
    #[must_use]
    pub const fn case(&self) -> CaseMode {
        self.case
    }

    /// Characters of `s` as compared under the case policy
    fn folded(self, s: &str) -> impl Iterator<Item = char> + '_ {
        let insensitive = self.case == CaseMode::Insensitive;
        s.chars().flat_map(move |c| {
            let lower = c.to_lowercase();
            if insensitive { EitherChars::Lower(lower) } else { EitherChars::Exact(Some(c)) }
        })
    }

    /// Check if `query` is a subsequence of `name`
    ///
    /// Two-pointer scan: each query char consumes name chars up to and
    /// including its next occurrence.
    #[must_use]
    pub fn is_match(&self, query: &str, name: &str) -> bool {
        let mut name_chars = self.folded(name);
        self.folded(query).all(|q| name_chars.any(|n| n == q))
    }

    /// Classify how `name` matches `query`, if at all
    #[must_use]
    pub fn classify(&self, query: &str, name: &str) -> Option<MatchKind> {
        let mut name_chars = self.folded(name);
        if self.folded(query).all(|q| name_chars.next() == Some(q)) {
            return Some(MatchKind::Prefix);
        }
        self.is_match(query, name).then_some(MatchKind::Subsequence)
    }

    /// All candidates matching `query`, best first
    ///
    /// Every candidate is evaluated exactly once. The order is total:
    /// prefix matches first, then shorter names, then names in byte order,
    /// then resolution path.
    #[must_use]
    pub fn rank<'a>(&self, query: &str, candidates: &'a [Candidate]) -> Vec<Match<'a>> {
        let mut matches: Vec<Match<'a>> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                self.classify(query, &candidate.name).map(|kind| Match { candidate, index, kind })
            })
            .collect();

        matches.sort_by(compare);

        assert!(matches.len() <= candidates.len(), "Every candidate must be considered once");

        matches
    }

    /// The first `limit` matches of [`Matcher::rank`]
    #[must_use]
    pub fn rank_top<'a>(
        &self,
        query: &str,
        candidates: &'a [Candidate],
        limit: usize,
    ) -> Vec<Match<'a>> {
        let mut matches = self.rank(query, candidates);
        matches.truncate(limit);
        matches
    }
}

/// Display order of two matches
fn compare(a: &Match<'_>, b: &Match<'_>) -> Ordering {
    a.kind
        .cmp(&b.kind)
        .then_with(|| a.candidate.name.chars().count().cmp(&b.candidate.name.chars().count()))
        .then_with(|| a.candidate.name.cmp(&b.candidate.name))
        .then_with(|| a.candidate.path.cmp(&b.candidate.path))
}

/// Char iterator for either case policy
enum EitherChars {
    /// Lowercase mapping of one char
    Lower(std::char::ToLowercase),
    /// The char itself
    Exact(Option<char>),
}

impl Iterator for EitherChars {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match self {
            Self::Lower(lower) => lower.next(),
            Self::Exact(c) => c.take(),
        }
    }
}
