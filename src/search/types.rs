//! Search result types

use crate::document::NodeId;
use serde::{Deserialize, Serialize};

/// One occurrence of the pattern inside a text leaf
///
/// Offsets are byte offsets into the leaf text as it was at scan time and
/// always fall on character boundaries, with `start < end`. `anchor` is the
/// scanned text leaf until the match is highlighted, then the marker
/// element that wraps `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub anchor: NodeId,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Matches in document order: leaf traversal order, then ascending start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    matches: Vec<Match>,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Match> {
        self.matches.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    pub fn clear(&mut self) {
        self.matches.clear();
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

impl From<Vec<Match>> for MatchSet {
    fn from(matches: Vec<Match>) -> Self {
        Self { matches }
    }
}

/// Match count and 1-based position of the current match
///
/// `current_match` is 0 exactly when `match_count` is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub match_count: usize,
    pub current_match: usize,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Direction::Next),
            "prev" => Ok(Direction::Prev),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}
