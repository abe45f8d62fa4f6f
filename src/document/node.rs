//! Node representation in the document tree

use serde::{Deserialize, Serialize};

/// Handle to a node in a document arena
///
/// Ids stay valid after a node is detached; use
/// [`Document::is_attached`](super::Document::is_attached) to check liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element with a tag name, attributes and classes
    Element,
    /// Text content
    Text,
    /// Comment or raw markup carried through untouched
    Comment,
}

/// A node in the document arena
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Lowercase tag name (elements only)
    pub tag: Option<String>,
    /// Character data (text and comment nodes)
    pub text: String,
    /// Attributes other than `class`, in insertion order
    pub attributes: Vec<(String, String)>,
    /// Class list
    pub classes: Vec<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: None,
            text: String::new(),
            attributes: Vec::new(),
            classes: Vec::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub(crate) fn document() -> Self {
        Self::with_kind(NodeKind::Document)
    }

    pub(crate) fn element(tag: &str) -> Self {
        let mut node = Self::with_kind(NodeKind::Element);
        node.tag = Some(tag.to_ascii_lowercase());
        node
    }

    pub(crate) fn text(text: impl Into<String>) -> Self {
        let mut node = Self::with_kind(NodeKind::Text);
        node.text = text.into();
        node
    }

    pub(crate) fn comment(text: impl Into<String>) -> Self {
        let mut node = Self::with_kind(NodeKind::Comment);
        node.text = text.into();
        node
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Check whether this is an element with the given tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(tag))
            .unwrap_or(false)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}
