//! Per-leaf pattern matching

use super::types::{Match, MatchSet};
use crate::document::{Document, NodeId};
use crate::pattern::CompiledPattern;
use regex::Regex;

/// Append every non-overlapping match of `regex` in one leaf's text
///
/// Scanning resumes at each match end. An empty match moves the scan one
/// character forward and is not recorded.
pub fn scan_leaf(regex: &Regex, leaf: NodeId, text: &str, out: &mut Vec<Match>) {
    let mut pos = 0;
    while pos <= text.len() {
        let Some(found) = regex.find_at(text, pos) else {
            break;
        };
        if found.start() == found.end() {
            let step = text[found.end()..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
            pos = found.end() + step;
            continue;
        }
        out.push(Match {
            anchor: leaf,
            start: found.start(),
            end: found.end(),
            text: found.as_str().to_string(),
        });
        pos = found.end();
    }
}

/// Match every leaf in order, producing the document's match set
///
/// A pattern without the global flag stops at the first match.
pub fn scan(doc: &Document, leaves: &[NodeId], pattern: &CompiledPattern) -> MatchSet {
    let mut found = Vec::new();
    for &leaf in leaves {
        let Some(text) = doc.text(leaf) else {
            continue;
        };
        scan_leaf(pattern.regex(), leaf, text, &mut found);
        if !pattern.flags().global && !found.is_empty() {
            found.truncate(1);
            break;
        }
    }
    MatchSet::from(found)
}
