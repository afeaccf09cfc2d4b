//! Common types and constants for `Proslenkey`

use std::path::PathBuf;

/// Application name, used for the config directory
pub const APP_NAME: &str = "proslenkey";

/// Maximum number of candidates collected from the search path
pub const MAX_CANDIDATES: usize = 65_536;

/// Default number of suggestions shown at once
pub const DEFAULT_SUGGESTIONS: usize = 20;

/// Upper bound for the configurable suggestion count
pub const MAX_SUGGESTIONS_LIMIT: usize = 200;

/// Maximum query length in characters
pub const MAX_QUERY_LENGTH: usize = 1_024;

/// An executable discovered on the search path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// File name of the executable
    pub name: String,
    /// Path the name resolves to
    pub path: PathBuf,
}

impl Candidate {
    /// Create a candidate from a name and its resolved path
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

/// How a match relates to the query
///
/// Ordered so that better kinds compare lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    /// The query is a prefix of the name
    Prefix,
    /// The query is a scattered subsequence of the name
    Subsequence,
}

/// A candidate that matched the current query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// The matching candidate
    pub candidate: &'a Candidate,
    /// Position of the candidate in the slice that was ranked
    pub index:     usize,
    /// Match quality
    pub kind:      MatchKind,
}

impl Match<'_> {
    /// Name of the matched candidate
    #[must_use]
    pub fn name(&self) -> &str {
        &self.candidate.name
    }
}

const _: () = {
    assert!(MAX_CANDIDATES > 0);
    assert!(DEFAULT_SUGGESTIONS > 0);
    assert!(DEFAULT_SUGGESTIONS <= MAX_SUGGESTIONS_LIMIT);
    assert!(MAX_QUERY_LENGTH > 0);
};
