//! Document: an arena-backed tree of elements and text

use super::node::{Node, NodeId, NodeKind};
use thiserror::Error;

/// Errors from structural document operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Invalid hierarchy: {0}")]
    Hierarchy(String),
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// A mutable document tree
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Removing a node
/// only unlinks it; the id remains valid and the node keeps its own subtree,
/// so callers holding stale ids can still read them and check
/// [`Document::is_attached`].
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            root: NodeId::from_index(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DocumentResult<&Node> {
        self.get(id).ok_or(DocumentError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DocumentResult<&mut Node> {
        self.get_mut(id).ok_or(DocumentError::NodeNotFound(id))
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::comment(text))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Iterate the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// All descendants of `id` (excluding `id`) in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let before = stack.len();
            stack.extend(self.children(current));
            stack[before..].reverse();
        }
        out
    }

    /// Check whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Check whether the node is still reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.is_inclusive_ancestor(self.root, id)
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).filter(|n| n.is_text()).map(|n| n.text.as_str())
    }

    /// Concatenated text of all descendant text nodes (comments excluded)
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(node) if node.is_text() => node.text.clone(),
            Some(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|d| self.text(d))
                .collect(),
            None => String::new(),
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.tag.as_deref())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attribute(name))
    }

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DocumentResult<()> {
        let node = self.node_mut(id)?;
        let name = name.into();
        let value = value.into();
        match node.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => node.attributes.push((name, value)),
        }
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).map(|n| n.has_class(class)).unwrap_or(false)
    }

    /// Add a class; returns false if it was already present
    pub fn add_class(&mut self, id: NodeId, class: &str) -> DocumentResult<bool> {
        let node = self.node_mut(id)?;
        if node.has_class(class) {
            return Ok(false);
        }
        node.classes.push(class.to_string());
        Ok(true)
    }

    /// Remove a class; returns false if it was not present
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> DocumentResult<bool> {
        let node = self.node_mut(id)?;
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        Ok(node.classes.len() != before)
    }

    /// Attached elements under `root` carrying `class`, in document order
    pub fn elements_with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| {
                self.get(id)
                    .map(|n| n.is_element() && n.has_class(class))
                    .unwrap_or(false)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> DocumentResult<()> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        if matches!(parent_node.kind, NodeKind::Text | NodeKind::Comment) {
            return Err(DocumentError::Hierarchy(format!(
                "{} cannot have children",
                parent
            )));
        }
        if child == self.root {
            return Err(DocumentError::Hierarchy("cannot move the document root".into()));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DocumentError::Hierarchy(format!(
                "{} is an ancestor of {}",
                child, parent
            )));
        }
        Ok(())
    }

    /// Unlink a node from its parent, if it has one
    fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };
        let Some(parent) = parent else {
            return;
        };
        match prev {
            Some(p) => self.nodes[p.index()].next_sibling = next,
            None => self.nodes[parent.index()].first_child = next,
        }
        match next {
            Some(n) => self.nodes[n.index()].prev_sibling = prev,
            None => self.nodes[parent.index()].last_child = prev,
        }
        let node = &mut self.nodes[id.index()];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Link `child` as last child of `parent` without validation
    ///
    /// Used by loaders that build trees top-down from fresh nodes.
    pub(crate) fn link_child(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = Some(parent);
            node.prev_sibling = last;
            node.next_sibling = None;
        }
        match last {
            Some(l) => self.nodes[l.index()].next_sibling = Some(child),
            None => self.nodes[parent.index()].first_child = Some(child),
        }
        self.nodes[parent.index()].last_child = Some(child);
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DocumentResult<()> {
        self.check_insertable(parent, child)?;
        self.unlink(child);
        self.link_child(parent, child);
        Ok(())
    }

    /// Insert `child` into `parent` immediately before `reference`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> DocumentResult<()> {
        if child == reference {
            return Ok(());
        }
        self.check_insertable(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DocumentError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.unlink(child);

        let prev = self.nodes[reference.index()].prev_sibling;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(reference);
        }
        self.nodes[reference.index()].prev_sibling = Some(child);
        match prev {
            Some(p) => self.nodes[p.index()].next_sibling = Some(child),
            None => self.nodes[parent.index()].first_child = Some(child),
        }
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DocumentResult<()> {
        self.node(parent)?;
        if self.parent(child) != Some(parent) {
            return Err(DocumentError::NotAChild { parent, child });
        }
        self.unlink(child);
        Ok(())
    }

    /// Put `new_child` where `old_child` was and detach `old_child`
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DocumentResult<()> {
        self.insert_before(parent, new_child, old_child)?;
        self.remove_child(parent, old_child)
    }

    /// Merge adjacent text nodes and drop empty ones under `id`
    ///
    /// Returns the number of text nodes removed.
    pub fn normalize(&mut self, id: NodeId) -> usize {
        let mut removed = 0;
        let mut containers = vec![id];
        containers.extend(self.descendants(id));

        for container in containers {
            let mut child = self.first_child(container);
            while let Some(current) = child {
                let next = self.next_sibling(current);
                if !self.get(current).map(Node::is_text).unwrap_or(false) {
                    child = next;
                    continue;
                }

                // Absorb following text siblings into `current`
                let mut follower = next;
                while let Some(f) = follower {
                    if !self.get(f).map(Node::is_text).unwrap_or(false) {
                        break;
                    }
                    let data = std::mem::take(&mut self.nodes[f.index()].text);
                    self.nodes[current.index()].text.push_str(&data);
                    follower = self.next_sibling(f);
                    self.unlink(f);
                    removed += 1;
                }

                if self.nodes[current.index()].text.is_empty() {
                    self.unlink(current);
                    removed += 1;
                }
                child = follower;
            }
        }
        removed
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}
