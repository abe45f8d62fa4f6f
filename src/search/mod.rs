//! Search pipeline: walk text leaves, match, highlight, navigate, restore

pub mod highlight;
pub mod matcher;
pub mod navigate;
pub mod restore;
pub mod walker;
mod types;

pub use highlight::MATCH_INDEX_ATTR;
pub use navigate::{AnchorStatus, NavigationState, NoReveal, Reveal, RevealLog};
pub use restore::RestoreReport;
pub use types::{Direction, Match, MatchSet, SearchResult};
pub use walker::{TextWalker, WalkFilter};
