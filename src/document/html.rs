//! HTML serialization for display and diagnostics

use super::node::{NodeId, NodeKind};
use super::tree::Document;

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

impl Document {
    /// Serialize the subtree rooted at `id` as HTML
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut steps = vec![Step::Enter(id)];

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(current) => {
                    let Some(node) = self.get(current) else {
                        continue;
                    };
                    match node.kind {
                        NodeKind::Document => {
                            self.push_children(current, &mut steps);
                        }
                        NodeKind::Text => {
                            let raw = self
                                .parent(current)
                                .and_then(|p| self.tag(p))
                                .map(|t| RAW_TEXT_ELEMENTS.contains(&t))
                                .unwrap_or(false);
                            if raw {
                                out.push_str(&node.text);
                            } else {
                                escape_text(&node.text, &mut out);
                            }
                        }
                        NodeKind::Comment => {
                            if node.text.trim_start().starts_with('<') {
                                out.push_str(&node.text);
                            } else {
                                out.push_str("<!--");
                                out.push_str(&node.text);
                                out.push_str("-->");
                            }
                        }
                        NodeKind::Element => {
                            let tag = node.tag.as_deref().unwrap_or("div");
                            out.push('<');
                            out.push_str(tag);
                            if !node.classes.is_empty() {
                                out.push_str(" class=\"");
                                escape_attr(&node.classes.join(" "), &mut out);
                                out.push('"');
                            }
                            for (name, value) in &node.attributes {
                                out.push(' ');
                                out.push_str(name);
                                out.push_str("=\"");
                                escape_attr(value, &mut out);
                                out.push('"');
                            }
                            out.push('>');
                            if !VOID_ELEMENTS.contains(&tag) {
                                steps.push(Step::Leave(current));
                                self.push_children(current, &mut steps);
                            }
                        }
                    }
                }
                Step::Leave(current) => {
                    if let Some(tag) = self.tag(current) {
                        out.push_str("</");
                        out.push_str(tag);
                        out.push('>');
                    }
                }
            }
        }
        out
    }

    fn push_children(&self, id: NodeId, steps: &mut Vec<Step>) {
        let start = steps.len();
        steps.extend(self.children(id).map(Step::Enter));
        steps[start..].reverse();
    }
}
