//! Search patterns
//!
//! A [`Pattern`] is the portable description of a term search: the
//! alternation source, its flags, and the terms it was built from. It is
//! produced by [`Pattern::from_terms`] and turned into an executable
//! [`CompiledPattern`] before scanning. Hosts that receive a pattern over
//! the wire compile it directly with [`CompiledPattern::new`].

mod compiler;
mod flags;

pub use compiler::CompiledPattern;
pub use flags::PatternFlags;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building or compiling a pattern
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Empty pattern: no usable search terms")]
    Empty,

    #[error("Invalid pattern flags: {0}")]
    InvalidFlags(String),

    #[error("Invalid pattern syntax: {0}")]
    Syntax(#[from] regex::Error),
}

/// Result type for pattern operations
pub type PatternResult<T> = Result<T, PatternError>;

/// A whole-word, case-insensitive alternation of search terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Regex source, `\b(?:term|term|...)\b`
    pub source: String,
    pub flags: PatternFlags,
    /// Deduplicated terms, canonical term first
    pub terms: Vec<String>,
}

impl Pattern {
    /// Build a pattern from a canonical term and its known variants
    ///
    /// Terms are trimmed; blanks and repeats are dropped keeping the first
    /// occurrence, so the canonical term always leads. Every regex
    /// metacharacter is escaped before the terms are joined.
    ///
    /// Substring variants are not de-overlapped: with terms `Acme Corp` and
    /// `Acme`, the text "Acme Corp" yields one match (the longer alternative
    /// is tried first at that position) but a standalone "Acme" elsewhere is
    /// counted on its own.
    pub fn from_terms<S: AsRef<str>>(canonical: &str, variants: &[S]) -> PatternResult<Self> {
        let mut terms: Vec<String> = Vec::with_capacity(variants.len() + 1);
        let candidates = std::iter::once(canonical).chain(variants.iter().map(|v| v.as_ref()));
        for term in candidates {
            let term = term.trim();
            if term.is_empty() || terms.iter().any(|t| t == term) {
                continue;
            }
            terms.push(term.to_string());
        }

        if terms.is_empty() {
            return Err(PatternError::Empty);
        }

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            source: format!(r"\b(?:{})\b", alternation),
            flags: PatternFlags::search_default(),
            terms,
        })
    }

    /// Compile into an executable pattern
    pub fn compile(&self) -> PatternResult<CompiledPattern> {
        CompiledPattern::with_flags(&self.source, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_plus_variant() {
        let pattern = Pattern::from_terms("Acme Corp", &["Acme"]).unwrap();
        assert_eq!(pattern.source, r"\b(?:Acme Corp|Acme)\b");
        assert_eq!(pattern.terms, vec!["Acme Corp", "Acme"]);
        assert!(pattern.flags.global);
        assert!(pattern.flags.case_insensitive);
    }

    #[test]
    fn test_duplicates_and_blanks_dropped() {
        let pattern =
            Pattern::from_terms("Globex", &["", "Globex", "  ", "Globex Inc", "Globex Inc"]).unwrap();
        assert_eq!(pattern.terms, vec!["Globex", "Globex Inc"]);
        assert_eq!(pattern.source, r"\b(?:Globex|Globex Inc)\b");
    }

    #[test]
    fn test_no_variants() {
        let pattern = Pattern::from_terms::<&str>("Initech", &[]).unwrap();
        assert_eq!(pattern.source, r"\b(?:Initech)\b");
    }

    #[test]
    fn test_metacharacters_escaped() {
        let pattern = Pattern::from_terms("A.B (US) $", &["A.B", "x|y"]).unwrap();
        assert!(pattern.source.contains(r"A\.B \(US\) \$"));

        // Escaped terms match literally and nothing else
        let compiled = pattern.compile().unwrap();
        assert!(compiled.regex().is_match("see A.B today"));
        assert!(compiled.regex().is_match("either x|y works"));
        assert!(!compiled.regex().is_match("AxB"));
        assert!(!compiled.regex().is_match("x"));
    }

    #[test]
    fn test_trailing_symbol_needs_word_after() {
        // `\b` after a non-word character only holds before a word character
        let compiled = Pattern::from_terms::<&str>("C++", &[]).unwrap().compile().unwrap();
        assert!(!compiled.regex().is_match("the C++ group"));
        assert!(compiled.regex().is_match("C++x"));
    }

    #[test]
    fn test_empty_term_list_is_error() {
        assert!(matches!(
            Pattern::from_terms("   ", &["", " "]),
            Err(PatternError::Empty)
        ));
    }

    #[test]
    fn test_compiled_is_case_insensitive_whole_word() {
        let compiled = Pattern::from_terms::<&str>("acme", &[]).unwrap().compile().unwrap();
        assert!(compiled.regex().is_match("ACME rockets"));
        assert!(!compiled.regex().is_match("acmeology"));
    }
}
