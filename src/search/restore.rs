//! Highlight removal
//!
//! Every marker still in the document is replaced by a plain text node with
//! its text, then the affected containers are normalized so split leaves
//! merge back into one.

use crate::document::{Document, NodeId};
use tracing::{debug, trace};

/// What a restore pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Markers replaced by text
    pub restored: usize,
    /// Markers that could not be replaced and were left alone
    pub skipped: usize,
    /// Text nodes merged away while normalizing
    pub merged: usize,
    /// Markers of the current search already removed by someone else
    pub detached: usize,
}

/// Remove every marker carrying `class` under `root`
///
/// Markers that are no longer attached are never found, so restoring twice
/// (or restoring a document that was never searched) changes nothing.
pub fn restore(doc: &mut Document, root: NodeId, class: &str) -> RestoreReport {
    let mut report = RestoreReport::default();
    let mut parents: Vec<NodeId> = Vec::new();

    for marker in doc.elements_with_class(root, class) {
        let Some(parent) = doc.parent(marker) else {
            report.skipped += 1;
            continue;
        };
        let text = doc.create_text(doc.text_content(marker));
        match doc.replace_child(parent, text, marker) {
            Ok(()) => {
                report.restored += 1;
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
            Err(e) => {
                trace!(marker = %marker, error = %e, "marker not restored");
                report.skipped += 1;
            }
        }
    }

    for parent in parents {
        if doc.is_attached(parent) {
            report.merged += doc.normalize(parent);
        }
    }

    if report.restored > 0 {
        debug!(restored = report.restored, merged = report.merged, "restored highlights");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBuilder;

    const CLASS: &str = "termlight-highlight";

    fn marked_paragraph() -> (Document, NodeId) {
        // <p><span class=hl>Foo</span> bar <span class=hl>Foo</span> baz</p>
        let doc = DocumentBuilder::new()
            .open("p")
            .open("span")
            .class(CLASS)
            .text("Foo")
            .close()
            .text(" bar ")
            .open("span")
            .class(CLASS)
            .text("Foo")
            .close()
            .text(" baz")
            .close()
            .build();
        let p = doc.first_child(doc.root()).unwrap();
        (doc, p)
    }

    #[test]
    fn test_restore_merges_into_single_leaf() {
        let (mut doc, p) = marked_paragraph();
        let root = doc.root();
        let report = restore(&mut doc, root, CLASS);

        assert_eq!(report.restored, 2);
        assert_eq!(report.skipped, 0);
        let children: Vec<_> = doc.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.text(children[0]), Some("Foo bar Foo baz"));
        assert!(doc.elements_with_class(root, CLASS).is_empty());
    }

    #[test]
    fn test_restore_is_idempotent() {
        let (mut doc, p) = marked_paragraph();
        let root = doc.root();
        restore(&mut doc, root, CLASS);
        let html = doc.to_html(root);

        let second = restore(&mut doc, root, CLASS);
        assert_eq!(second, RestoreReport::default());
        assert_eq!(doc.to_html(root), html);
        assert_eq!(doc.children(p).count(), 1);
    }

    #[test]
    fn test_detached_markers_ignored() {
        let (mut doc, p) = marked_paragraph();
        let root = doc.root();
        let first_marker = doc.first_child(p).unwrap();
        doc.remove_child(p, first_marker).unwrap();

        let report = restore(&mut doc, root, CLASS);
        assert_eq!(report.restored, 1);
        assert_eq!(doc.text_content(p), " bar Foo baz");
        assert_eq!(doc.children(p).count(), 1);
    }

    #[test]
    fn test_other_classes_untouched() {
        let mut doc = DocumentBuilder::new()
            .open("p")
            .open("span")
            .class("note")
            .text("keep")
            .close()
            .close()
            .build();
        let root = doc.root();
        let before = doc.to_html(root);
        assert_eq!(restore(&mut doc, root, CLASS).restored, 0);
        assert_eq!(doc.to_html(root), before);
    }
}
