//! Text leaf traversal
//!
//! Yields the text nodes of a subtree in document order using an explicit
//! stack, so arbitrarily deep documents never grow the call stack.

use crate::config::EngineConfig;
use crate::document::{Document, NodeId, NodeKind};
use tracing::trace;

/// Verdict for a node during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkFilter {
    /// Yield the node
    Accept,
    /// Do not yield the node, but visit its children
    Skip,
    /// Do not yield the node or anything below it
    Reject,
}

/// Iterator over searchable text leaves under a root
pub struct TextWalker<'a> {
    doc: &'a Document,
    config: &'a EngineConfig,
    stack: Vec<NodeId>,
}

impl<'a> TextWalker<'a> {
    pub fn new(doc: &'a Document, root: NodeId, config: &'a EngineConfig) -> Self {
        Self {
            doc,
            config,
            stack: vec![root],
        }
    }

    fn in_hidden_container(&self, id: NodeId) -> bool {
        self.doc
            .parent(id)
            .and_then(|p| self.doc.tag(p))
            .map(|tag| self.config.is_hidden_tag(tag))
            .unwrap_or(false)
    }

    /// Classify a node the way the walker treats it
    pub fn classify(&self, id: NodeId) -> WalkFilter {
        let Some(node) = self.doc.get(id) else {
            return WalkFilter::Reject;
        };
        match node.kind {
            NodeKind::Document => WalkFilter::Skip,
            NodeKind::Element => match node.tag.as_deref() {
                Some(tag) if self.config.is_hidden_tag(tag) => WalkFilter::Reject,
                _ => WalkFilter::Skip,
            },
            NodeKind::Text => {
                if self.in_hidden_container(id) {
                    WalkFilter::Reject
                } else if node.text.trim().is_empty() {
                    WalkFilter::Skip
                } else {
                    WalkFilter::Accept
                }
            }
            NodeKind::Comment => WalkFilter::Reject,
        }
    }
}

impl Iterator for TextWalker<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            match self.classify(current) {
                WalkFilter::Reject => {
                    trace!(node = %current, "rejected subtree");
                }
                WalkFilter::Skip => {
                    let start = self.stack.len();
                    self.stack.extend(self.doc.children(current));
                    self.stack[start..].reverse();
                }
                WalkFilter::Accept => return Some(current),
            }
        }
        None
    }
}

/// Collect the searchable text leaves under `root` in document order
pub fn text_leaves(doc: &Document, root: NodeId, config: &EngineConfig) -> Vec<NodeId> {
    TextWalker::new(doc, root, config).collect()
}
