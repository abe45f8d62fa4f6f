//! Highlight markers
//!
//! Wraps each match in a marker element, splitting its text leaf into
//! `before`, marker, `after`.
//!
//! Edits are applied from the last match in the document to the first.
//! Splitting a leaf at a later offset leaves its prefix (and therefore
//! every earlier offset in that leaf) untouched, and leaves earlier in
//! document order are never visited before their own matches are applied.
//! The prefix of a split leaf becomes the node that the leaf's next
//! (earlier) match is applied to.

use super::types::MatchSet;
use crate::config::EngineConfig;
use crate::document::{Document, DocumentResult, NodeId};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Attribute carrying a marker's position in the match set
pub const MATCH_INDEX_ATTR: &str = "data-match-index";

/// Wrap every match in a marker and repoint each match at its marker
///
/// Returns the number of markers inserted. Matches whose leaf has been
/// detached or whose offsets no longer fit the leaf are left unwrapped.
pub fn apply(doc: &mut Document, matches: &mut MatchSet, config: &EngineConfig) -> DocumentResult<usize> {
    // original leaf -> node currently holding its unprocessed prefix
    let mut remaining: HashMap<NodeId, NodeId> = HashMap::new();
    let mut inserted = 0;

    for index in (0..matches.len()).rev() {
        let Some(m) = matches.get(index) else {
            continue;
        };
        let leaf = m.anchor;
        let (start, end) = (m.start, m.end);
        let target = remaining.get(&leaf).copied().unwrap_or(leaf);

        let parent = match doc.parent(target) {
            Some(parent) if doc.is_attached(target) => parent,
            _ => {
                warn!(match_index = index, leaf = %leaf, "leaf detached before highlighting");
                continue;
            }
        };
        let Some(text) = doc.text(target) else {
            continue;
        };
        if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            warn!(match_index = index, start, end, "match offsets no longer fit leaf");
            continue;
        }

        let before = text[..start].to_string();
        let matched = text[start..end].to_string();
        let after = text[end..].to_string();

        let marker = create_marker(doc, index, &matched, config)?;

        if !before.is_empty() {
            let before_id = doc.create_text(before);
            doc.insert_before(parent, before_id, target)?;
            remaining.insert(leaf, before_id);
        } else {
            remaining.remove(&leaf);
        }
        doc.insert_before(parent, marker, target)?;
        if !after.is_empty() {
            let after_id = doc.create_text(after);
            doc.insert_before(parent, after_id, target)?;
        }
        doc.remove_child(parent, target)?;

        if let Some(m) = matches.get_mut(index) {
            m.anchor = marker;
        }
        inserted += 1;
    }

    debug!(inserted, total = matches.len(), "highlighted matches");
    Ok(inserted)
}

fn create_marker(
    doc: &mut Document,
    index: usize,
    matched: &str,
    config: &EngineConfig,
) -> DocumentResult<NodeId> {
    let marker = doc.create_element(&config.marker_tag);
    doc.add_class(marker, &config.highlight_class)?;
    doc.set_attribute(marker, MATCH_INDEX_ATTR, index.to_string())?;
    doc.set_attribute(marker, "title", format!("Match {}: \"{}\"", index + 1, matched))?;
    let text = doc.create_text(matched);
    doc.append_child(marker, text)?;
    Ok(marker)
}
