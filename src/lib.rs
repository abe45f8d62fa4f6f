//! Termlight: term search, highlighting and navigation over documents
//!
//! Searches the visible text of a hierarchical document for a set of
//! terms, wraps every occurrence in a marker element, keeps a current-match
//! pointer that can be moved forwards and backwards, and restores the
//! document to its original text structure on request.
//!
//! # Core Concepts
//!
//! - **Pattern**: a whole-word, case-insensitive alternation of a canonical
//!   term and its variants
//! - **Leaf**: a visible text node; matches never span leaves
//! - **Marker**: the element wrapping one match, carrying the highlight class
//! - **Restore**: replacing markers with their text and merging split leaves
//!
//! # Example
//!
//! ```
//! use termlight::{Document, SearchEngine};
//!
//! let doc = Document::from_markdown("Acme Corp announced Acme's new strategy.");
//! let mut engine = SearchEngine::new(doc);
//! let result = engine.search_terms("Acme Corp", &["Acme"]).unwrap();
//! assert_eq!(result.match_count, 2);
//! assert_eq!(result.current_match, 1);
//! ```

pub mod config;
pub mod document;
mod engine;
pub mod pattern;
pub mod search;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use document::{Document, DocumentBuilder, DocumentError, NodeId, NodeKind};
pub use engine::{EngineError, EngineResult, EngineState, SearchEngine};
pub use pattern::{CompiledPattern, Pattern, PatternError, PatternFlags};
pub use search::{Direction, Match, MatchSet, RestoreReport, Reveal, SearchResult};
pub use service::{LoadSignal, ReadyState, Request, Response, SearchHandle, SearchService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
