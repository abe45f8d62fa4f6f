//! SearchEngine: search, navigation and restore over one document

use crate::config::{ConfigError, EngineConfig};
use crate::document::{Document, DocumentError, NodeId};
use crate::pattern::{CompiledPattern, Pattern, PatternError};
use crate::search::{
    highlight, matcher, restore, walker, AnchorStatus, Direction, NavigationState, NoReveal,
    RestoreReport, Reveal, SearchResult,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur in engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine busy: another request is outstanding")]
    Busy,

    #[error("Search service stopped")]
    ServiceStopped,

    #[error("Document load signal dropped before the document finished loading")]
    LoadAborted,
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Lifecycle of the engine's search state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// No search applied
    Idle,
    /// A scan is in progress
    Scanning,
    /// Last search found nothing
    Empty,
    /// Markers are in the document and navigation is live
    Highlighted,
    /// The current-match pointer is moving
    Navigating,
}

/// Search engine bound to a single document
///
/// Owns the document, the match set and the current-match pointer. Every
/// search first restores the previous one, so at most one set of markers
/// is ever in the document.
pub struct SearchEngine {
    document: Document,
    config: EngineConfig,
    navigation: NavigationState,
    state: EngineState,
    reveal: Box<dyn Reveal>,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("matches", &self.navigation.len())
            .field("current", &self.navigation.current_index())
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    /// Create an engine with default configuration
    pub fn new(document: Document) -> Self {
        Self::with_config(document, EngineConfig::default())
    }

    pub fn with_config(document: Document, config: EngineConfig) -> Self {
        Self {
            document,
            config,
            navigation: NavigationState::default(),
            state: EngineState::Idle,
            reveal: Box::new(NoReveal),
        }
    }

    /// Set the hook used to bring the current marker into view
    pub fn with_reveal(mut self, reveal: impl Reveal + 'static) -> Self {
        self.reveal = Box::new(reveal);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for host-side edits between requests
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    /// Count and position of the current search
    pub fn result(&self) -> SearchResult {
        self.navigation.result()
    }

    /// Marker of the current match, if it is still in the document
    pub fn current_marker(&self) -> Option<NodeId> {
        match self
            .navigation
            .anchor_status(&self.document, self.navigation.current_index())
        {
            AnchorStatus::Attached(marker) => Some(marker),
            _ => None,
        }
    }

    /// Search with a pattern source and flag string received from a host
    ///
    /// `original_terms` is informational and only logged. An empty pattern
    /// yields zero matches; an invalid one is an error and leaves the
    /// engine idle.
    pub fn search(
        &mut self,
        pattern: &str,
        flags: &str,
        original_terms: &[String],
    ) -> EngineResult<SearchResult> {
        self.clear();
        if pattern.is_empty() {
            return Ok(SearchResult::empty());
        }
        info!(pattern, terms = ?original_terms, "search requested");

        let compiled = CompiledPattern::new(pattern, flags).map_err(|e| {
            warn!(pattern, error = %e, "pattern rejected");
            e
        })?;
        self.run(&compiled)
    }

    /// Search with a pattern built by [`Pattern::from_terms`]
    pub fn search_pattern(&mut self, pattern: &Pattern) -> EngineResult<SearchResult> {
        self.clear();
        info!(pattern = %pattern.source, terms = ?pattern.terms, "search requested");
        let compiled = pattern.compile()?;
        self.run(&compiled)
    }

    /// Search for a canonical term and its variants
    ///
    /// A term list with nothing usable in it searches for nothing and
    /// reports zero matches.
    pub fn search_terms<S: AsRef<str>>(
        &mut self,
        canonical: &str,
        variants: &[S],
    ) -> EngineResult<SearchResult> {
        match Pattern::from_terms(canonical, variants) {
            Ok(pattern) => self.search_pattern(&pattern),
            Err(PatternError::Empty) => {
                warn!(canonical, "no usable search terms");
                self.clear();
                Ok(SearchResult::empty())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deprecated single-term search; restores the document and finds nothing
    pub fn legacy_search(&mut self, search_term: &str) -> SearchResult {
        warn!(search_term, "legacy exact-term search is deprecated, use a pattern search");
        self.clear();
        SearchResult::empty()
    }

    fn run(&mut self, compiled: &CompiledPattern) -> EngineResult<SearchResult> {
        self.state = EngineState::Scanning;

        let root = self.document.root();
        let leaves = walker::text_leaves(&self.document, root, &self.config);
        let mut matches = matcher::scan(&self.document, &leaves, compiled);
        debug!(leaves = leaves.len(), matches = matches.len(), "scanned document");

        if let Err(e) = highlight::apply(&mut self.document, &mut matches, &self.config) {
            self.clear();
            return Err(e.into());
        }

        self.navigation = NavigationState::new(matches);
        let result = self
            .navigation
            .activate(&mut self.document, &self.config, self.reveal.as_mut());
        self.state = if result.match_count == 0 {
            EngineState::Empty
        } else {
            EngineState::Highlighted
        };

        info!(
            match_count = result.match_count,
            current_match = result.current_match,
            "search complete"
        );
        Ok(result)
    }

    /// Move to the next or previous match, wrapping around
    pub fn navigate(&mut self, direction: Direction) -> SearchResult {
        if self.state != EngineState::Highlighted {
            return self.navigation.result();
        }
        self.state = EngineState::Navigating;
        let result = self
            .navigation
            .step(direction, &mut self.document, &self.config, self.reveal.as_mut());
        self.state = EngineState::Highlighted;
        result
    }

    /// Remove every highlight and forget the current search
    pub fn clear(&mut self) -> RestoreReport {
        let detached = (0..self.navigation.len())
            .filter(|&i| {
                matches!(
                    self.navigation.anchor_status(&self.document, i),
                    AnchorStatus::Detached(_)
                )
            })
            .count();
        if detached > 0 {
            debug!(detached, "ignored markers removed by other document changes");
        }

        let root = self.document.root();
        let mut report = restore::restore(&mut self.document, root, &self.config.highlight_class);
        report.detached = detached;

        self.navigation.reset();
        self.state = EngineState::Idle;
        report
    }
}
