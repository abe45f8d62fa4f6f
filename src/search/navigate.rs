//! Current-match navigation
//!
//! The navigation state owns the match set and a pointer to the current
//! match. Moving the pointer swaps the "current" class between markers and
//! asks the host to bring the new marker into view.

use super::types::{Direction, MatchSet, SearchResult};
use crate::config::EngineConfig;
use crate::document::{Document, NodeId};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Host hook that brings a marker into view
pub trait Reveal: Send {
    fn reveal(&mut self, doc: &Document, marker: NodeId);
}

/// Reveal that does nothing, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReveal;

impl Reveal for NoReveal {
    fn reveal(&mut self, _doc: &Document, _marker: NodeId) {}
}

/// Reveal that records every revealed marker; clones share the log
#[derive(Debug, Default, Clone)]
pub struct RevealLog {
    revealed: Arc<Mutex<Vec<NodeId>>>,
}

impl RevealLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers revealed so far, oldest first
    pub fn revealed(&self) -> Vec<NodeId> {
        self.revealed.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.revealed.lock().ok().and_then(|v| v.last().copied())
    }
}

impl Reveal for RevealLog {
    fn reveal(&mut self, _doc: &Document, marker: NodeId) {
        if let Ok(mut revealed) = self.revealed.lock() {
            revealed.push(marker);
        }
    }
}

/// Liveness of a match's anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStatus {
    /// The anchor is in the document
    Attached(NodeId),
    /// The anchor was removed from the document by someone else
    Detached(NodeId),
    /// No match at that index
    Missing,
}

/// Match set plus the current-match pointer
///
/// `current` is always a valid index while the set is non-empty and 0
/// when it is empty.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    current: usize,
    matches: MatchSet,
}

impl NavigationState {
    pub fn new(matches: MatchSet) -> Self {
        Self {
            current: 0,
            matches,
        }
    }

    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Count and 1-based current position
    pub fn result(&self) -> SearchResult {
        if self.matches.is_empty() {
            return SearchResult::empty();
        }
        SearchResult {
            match_count: self.matches.len(),
            current_match: self.current + 1,
        }
    }

    /// Check whether the anchor at `index` is still part of the document
    pub fn anchor_status(&self, doc: &Document, index: usize) -> AnchorStatus {
        match self.matches.get(index) {
            None => AnchorStatus::Missing,
            Some(m) if doc.is_attached(m.anchor) => AnchorStatus::Attached(m.anchor),
            Some(m) => AnchorStatus::Detached(m.anchor),
        }
    }

    /// Point at the first match and decorate it
    pub fn activate(
        &mut self,
        doc: &mut Document,
        config: &EngineConfig,
        reveal: &mut dyn Reveal,
    ) -> SearchResult {
        self.current = 0;
        if !self.matches.is_empty() {
            self.decorate_current(doc, config, reveal);
        }
        self.result()
    }

    /// Move the pointer one step, wrapping at either end
    pub fn step(
        &mut self,
        direction: Direction,
        doc: &mut Document,
        config: &EngineConfig,
        reveal: &mut dyn Reveal,
    ) -> SearchResult {
        let n = self.matches.len();
        if n == 0 {
            return SearchResult::empty();
        }

        if let AnchorStatus::Attached(marker) = self.anchor_status(doc, self.current) {
            let _ = doc.remove_class(marker, &config.current_class);
        }

        self.current = match direction {
            Direction::Next => (self.current + 1) % n,
            Direction::Prev => (self.current + n - 1) % n,
        };
        debug!(?direction, current = self.current + 1, total = n, "moved current match");

        self.decorate_current(doc, config, reveal);
        self.result()
    }

    fn decorate_current(&self, doc: &mut Document, config: &EngineConfig, reveal: &mut dyn Reveal) {
        match self.anchor_status(doc, self.current) {
            AnchorStatus::Attached(marker) => {
                if doc.add_class(marker, &config.current_class).is_ok() {
                    reveal.reveal(doc, marker);
                }
            }
            AnchorStatus::Detached(marker) => {
                warn!(match_index = self.current, marker = %marker, "current marker is detached");
            }
            AnchorStatus::Missing => {}
        }
    }

    /// Drop all matches and reset the pointer
    pub fn reset(&mut self) {
        self.matches.clear();
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBuilder;
    use crate::pattern::CompiledPattern;
    use crate::search::{highlight, matcher, walker};

    fn setup(text: &str) -> (Document, NavigationState, EngineConfig) {
        let mut doc = DocumentBuilder::new().element("p", text).build();
        let config = EngineConfig::default();
        let leaves = walker::text_leaves(&doc, doc.root(), &config);
        let pattern = CompiledPattern::new(r"\bfoo\b", "gi").unwrap();
        let mut set = matcher::scan(&doc, &leaves, &pattern);
        highlight::apply(&mut doc, &mut set, &config).unwrap();
        (doc, NavigationState::new(set), config)
    }

    fn current_markers(doc: &Document, config: &EngineConfig) -> Vec<NodeId> {
        doc.elements_with_class(doc.root(), &config.current_class)
    }

    #[test]
    fn test_activate_decorates_first() {
        let (mut doc, mut nav, config) = setup("foo a foo b foo");
        let log = RevealLog::new();
        let mut reveal = log.clone();

        let result = nav.activate(&mut doc, &config, &mut reveal);
        assert_eq!(result, SearchResult { match_count: 3, current_match: 1 });

        let first = nav.matches().get(0).unwrap().anchor;
        assert_eq!(current_markers(&doc, &config), vec![first]);
        assert_eq!(log.revealed(), vec![first]);
    }

    #[test]
    fn test_next_wraps_around() {
        let (mut doc, mut nav, config) = setup("foo a foo b foo");
        let mut reveal = NoReveal;
        nav.activate(&mut doc, &config, &mut reveal);

        let positions: Vec<_> = (0..3)
            .map(|_| nav.step(Direction::Next, &mut doc, &config, &mut reveal).current_match)
            .collect();
        assert_eq!(positions, vec![2, 3, 1]);
        assert_eq!(current_markers(&doc, &config).len(), 1);
    }

    #[test]
    fn test_prev_from_first_goes_to_last() {
        let (mut doc, mut nav, config) = setup("foo a foo b foo");
        let mut reveal = NoReveal;
        nav.activate(&mut doc, &config, &mut reveal);

        let result = nav.step(Direction::Prev, &mut doc, &config, &mut reveal);
        assert_eq!(result.current_match, 3);
        let last = nav.matches().get(2).unwrap().anchor;
        assert_eq!(current_markers(&doc, &config), vec![last]);
    }

    #[test]
    fn test_empty_navigation() {
        let mut doc = Document::new();
        let mut nav = NavigationState::default();
        let config = EngineConfig::default();
        let mut reveal = NoReveal;
        assert_eq!(nav.activate(&mut doc, &config, &mut reveal), SearchResult::empty());
        assert_eq!(
            nav.step(Direction::Next, &mut doc, &config, &mut reveal),
            SearchResult::empty()
        );
        assert_eq!(
            nav.step(Direction::Prev, &mut doc, &config, &mut reveal),
            SearchResult::empty()
        );
    }

    #[test]
    fn test_detached_marker_is_tolerated() {
        let (mut doc, mut nav, config) = setup("foo a foo");
        let log = RevealLog::new();
        let mut reveal = log.clone();
        nav.activate(&mut doc, &config, &mut reveal);

        let second = nav.matches().get(1).unwrap().anchor;
        let parent = doc.parent(second).unwrap();
        doc.remove_child(parent, second).unwrap();
        assert_eq!(nav.anchor_status(&doc, 1), AnchorStatus::Detached(second));

        let result = nav.step(Direction::Next, &mut doc, &config, &mut reveal);
        assert_eq!(result.current_match, 2);
        assert!(current_markers(&doc, &config).is_empty());
        assert_eq!(log.revealed().len(), 1);

        // Leaving the detached marker is also a no-op
        let result = nav.step(Direction::Next, &mut doc, &config, &mut reveal);
        assert_eq!(result.current_match, 1);
        assert_eq!(log.revealed().len(), 2);
    }

    #[test]
    fn test_anchor_status_missing() {
        let nav = NavigationState::default();
        assert_eq!(nav.anchor_status(&Document::new(), 0), AnchorStatus::Missing);
    }
}
