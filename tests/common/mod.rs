//! Common test utilities for termlight integration tests
//!
//! Fixture documents, a seeded random document generator, and an
//! independent whole-word counter used as a reference for match counts.

#![allow(dead_code)]

pub mod generate;

#[allow(unused_imports)]
pub use generate::{random_document, TERMS};

use termlight::search::walker;
use termlight::{Document, EngineConfig, NodeId, SearchEngine};

pub const ACME_SENTENCE: &str = "Acme Corp announced Acme's new strategy.";

pub const PRESS_RELEASE: &str = r#"---
company: Acme Corp
---

# Acme Corp quarterly update

Acme Corp announced *record* growth. Analysts at **Globex** expected less
from ACME, but acme.com traffic doubled.

- Acme Corp hired 40 engineers
- Globex Inc. lost a contract to Acme
- Acmeology is not a word

> "We are Acme," said the CEO.

```rust
let acme = Acme::new();
```
"#;

/// Visible text leaves of `doc`, in document order
pub fn visible_leaves(doc: &Document, config: &EngineConfig) -> Vec<NodeId> {
    walker::text_leaves(doc, doc.root(), config)
}

/// Markers currently in the engine's document
pub fn markers(engine: &SearchEngine) -> Vec<NodeId> {
    let doc = engine.document();
    doc.elements_with_class(doc.root(), &engine.config().highlight_class)
}

/// Markers carrying the current-match class
pub fn current_markers(engine: &SearchEngine) -> Vec<NodeId> {
    let doc = engine.document();
    doc.elements_with_class(doc.root(), &engine.config().current_class)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Count non-overlapping, case-insensitive, whole-word occurrences of any
/// term in `text`, trying terms in order at each position
///
/// Terms must be ASCII and start and end with a word character.
pub fn count_whole_words(text: &str, terms: &[&str]) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        let at_boundary = i == 0 || !is_word_byte(bytes[i - 1]);
        let found = at_boundary
            .then(|| {
                terms.iter().find_map(|term| {
                    let end = i + term.len();
                    let fits = end <= bytes.len()
                        && bytes[i..end].eq_ignore_ascii_case(term.as_bytes())
                        && (end == bytes.len() || !is_word_byte(bytes[end]));
                    fits.then_some(end)
                })
            })
            .flatten();
        match found {
            Some(end) => {
                count += 1;
                i = end;
            }
            None => i += 1,
        }
    }
    count
}

/// Reference match count over every visible leaf of `doc`
pub fn expected_matches(doc: &Document, config: &EngineConfig, terms: &[&str]) -> usize {
    visible_leaves(doc, config)
        .into_iter()
        .filter_map(|leaf| doc.text(leaf))
        .map(|text| count_whole_words(text, terms))
        .sum()
}
