//! Fluent construction of documents

use super::node::{Node, NodeId};
use super::tree::Document;

/// Builds a document top-down
///
/// ```
/// use termlight::DocumentBuilder;
///
/// let doc = DocumentBuilder::new()
///     .open("p")
///     .text("Foo bar ")
///     .element("em", "Foo")
///     .close()
///     .element("script", "var foo;")
///     .build();
/// assert_eq!(doc.text_content(doc.root()), "Foo bar Foovar foo;");
/// ```
#[derive(Debug)]
pub struct DocumentBuilder {
    doc: Document,
    stack: Vec<NodeId>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let doc = Document::new();
        let root = doc.root();
        Self {
            doc,
            stack: vec![root],
        }
    }

    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.doc.root())
    }

    /// Open an element; subsequent content goes inside it until `close`
    pub fn open(mut self, tag: &str) -> Self {
        let id = self.doc.create_element(tag);
        let parent = self.top();
        self.doc.link_child(parent, id);
        self.stack.push(id);
        self
    }

    /// Close the innermost open element
    pub fn close(mut self) -> Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    /// Set an attribute on the innermost open element
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let top = self.top();
        if let Some(node) = self.node_mut(top) {
            node.attributes.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Add a class to the innermost open element
    pub fn class(mut self, class: &str) -> Self {
        let top = self.top();
        if let Some(node) = self.node_mut(top) {
            if !node.has_class(class) {
                node.classes.push(class.to_string());
            }
        }
        self
    }

    /// Append a text node to the innermost open element
    pub fn text(mut self, text: &str) -> Self {
        let id = self.doc.create_text(text);
        let parent = self.top();
        self.doc.link_child(parent, id);
        self
    }

    /// Append a comment node to the innermost open element
    pub fn comment(mut self, text: &str) -> Self {
        let id = self.doc.create_comment(text);
        let parent = self.top();
        self.doc.link_child(parent, id);
        self
    }

    /// Shorthand for `open(tag).text(text).close()`
    pub fn element(self, tag: &str, text: &str) -> Self {
        self.open(tag).text(text).close()
    }

    pub fn build(self) -> Document {
        self.doc
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id == self.doc.root() {
            return None;
        }
        self.doc.get_mut(id)
    }
}
