//! Markdown loader
//!
//! Parses markdown with pulldown-cmark and builds an HTML-shaped document:
//! headings, paragraphs, lists, block quotes, tables, code blocks, links,
//! emphasis. YAML/TOML front matter becomes a `<script type="text/yaml">`
//! block so that it is present in the tree but never treated as visible text.
//! Raw HTML is carried through as comment nodes.

use super::node::NodeId;
use super::tree::Document;
use pulldown_cmark::{CodeBlockKind, Event, MetadataBlockKind, Options, Parser, Tag};

/// Element produced for an opening markdown tag
struct Opened {
    /// Elements pushed onto the stack, outermost first
    elements: Vec<NodeId>,
}

impl Document {
    /// Build a document from markdown source
    pub fn from_markdown(source: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        options.insert(Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS);

        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.link_child(doc.root(), body);

        let mut stack: Vec<NodeId> = vec![body];
        let mut frames: Vec<usize> = Vec::new();
        // Open tags inside an image, the image itself included
        let mut image_depth = 0usize;

        for event in Parser::new_ext(source, options) {
            let top = stack.last().copied().unwrap_or(body);

            // Image descriptions only feed the alt attribute
            if image_depth > 0 {
                match event {
                    Event::Start(_) => {
                        image_depth += 1;
                        frames.push(0);
                    }
                    Event::End(_) => {
                        image_depth -= 1;
                        close_frame(&mut stack, &mut frames);
                    }
                    Event::Text(text) | Event::Code(text) => append_alt(&mut doc, top, &text),
                    Event::SoftBreak | Event::HardBreak => append_alt(&mut doc, top, " "),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(tag) => {
                    if matches!(tag, Tag::Image { .. }) {
                        image_depth = 1;
                    }
                    let opened = open_tag(&mut doc, top, tag);
                    frames.push(opened.elements.len());
                    stack.extend(opened.elements);
                }
                Event::End(_) => close_frame(&mut stack, &mut frames),
                Event::Text(text) => append_text(&mut doc, top, &text),
                Event::Code(code) => {
                    let el = child_element(&mut doc, top, "code");
                    append_text(&mut doc, el, &code);
                }
                Event::SoftBreak => append_text(&mut doc, top, "\n"),
                Event::HardBreak => {
                    child_element(&mut doc, top, "br");
                }
                Event::Rule => {
                    child_element(&mut doc, top, "hr");
                }
                Event::Html(raw) => {
                    let comment = doc.create_comment(raw.to_string());
                    doc.link_child(top, comment);
                }
                Event::FootnoteReference(label) => {
                    let sup = child_element(&mut doc, top, "sup");
                    append_text(&mut doc, sup, &label);
                }
                Event::TaskListMarker(checked) => {
                    let input = child_element(&mut doc, top, "input");
                    set_attr(&mut doc, input, "type", "checkbox");
                    if checked {
                        set_attr(&mut doc, input, "checked", "");
                    }
                }
                _ => {}
            }
        }

        doc
    }
}

fn close_frame(stack: &mut Vec<NodeId>, frames: &mut Vec<usize>) {
    let count = frames.pop().unwrap_or(0);
    for _ in 0..count {
        if stack.len() > 1 {
            stack.pop();
        }
    }
}

fn child_element(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let el = doc.create_element(tag);
    doc.link_child(parent, el);
    el
}

fn set_attr(doc: &mut Document, id: NodeId, name: &str, value: &str) {
    // Fresh elements always exist in the arena
    let _ = doc.set_attribute(id, name, value);
}

/// Append text, extending a trailing text node like an HTML parser would
fn append_text(doc: &mut Document, parent: NodeId, text: &str) {
    if let Some(last) = doc.last_child(parent) {
        if let Some(node) = doc.get_mut(last).filter(|n| n.is_text()) {
            node.text.push_str(text);
            return;
        }
    }
    let id = doc.create_text(text);
    doc.link_child(parent, id);
}

fn append_alt(doc: &mut Document, img: NodeId, text: &str) {
    let alt = format!("{}{}", doc.attribute(img, "alt").unwrap_or_default(), text);
    set_attr(doc, img, "alt", &alt);
}

fn open_tag(doc: &mut Document, parent: NodeId, tag: Tag<'_>) -> Opened {
    let single = |doc: &mut Document, name: &str| Opened {
        elements: vec![child_element(doc, parent, name)],
    };

    match tag {
        Tag::Paragraph => single(doc, "p"),
        Tag::Heading { level, id, .. } => {
            let opened = single(doc, &format!("h{}", level as u8));
            if let Some(anchor) = id {
                set_attr(doc, opened.elements[0], "id", &anchor);
            }
            opened
        }
        Tag::BlockQuote => single(doc, "blockquote"),
        Tag::CodeBlock(kind) => {
            let pre = child_element(doc, parent, "pre");
            let code = child_element(doc, pre, "code");
            if let CodeBlockKind::Fenced(lang) = kind {
                if !lang.is_empty() {
                    let _ = doc.add_class(code, &format!("language-{}", lang));
                }
            }
            Opened {
                elements: vec![pre, code],
            }
        }
        Tag::HtmlBlock => single(doc, "div"),
        Tag::List(Some(start)) => {
            let opened = single(doc, "ol");
            if start != 1 {
                set_attr(doc, opened.elements[0], "start", &start.to_string());
            }
            opened
        }
        Tag::List(None) => single(doc, "ul"),
        Tag::Item => single(doc, "li"),
        Tag::FootnoteDefinition(label) => {
            let opened = single(doc, "div");
            let _ = doc.add_class(opened.elements[0], "footnote-definition");
            set_attr(doc, opened.elements[0], "id", &label);
            opened
        }
        Tag::Table(_) => single(doc, "table"),
        Tag::TableHead => single(doc, "thead"),
        Tag::TableRow => single(doc, "tr"),
        Tag::TableCell => single(doc, "td"),
        Tag::Emphasis => single(doc, "em"),
        Tag::Strong => single(doc, "strong"),
        Tag::Strikethrough => single(doc, "del"),
        Tag::Link {
            dest_url, title, ..
        } => {
            let opened = single(doc, "a");
            set_attr(doc, opened.elements[0], "href", &dest_url);
            if !title.is_empty() {
                set_attr(doc, opened.elements[0], "title", &title);
            }
            opened
        }
        Tag::Image {
            dest_url, title, ..
        } => {
            let opened = single(doc, "img");
            set_attr(doc, opened.elements[0], "src", &dest_url);
            if !title.is_empty() {
                set_attr(doc, opened.elements[0], "title", &title);
            }
            opened
        }
        Tag::MetadataBlock(kind) => {
            let opened = single(doc, "script");
            let mime = match kind {
                MetadataBlockKind::YamlStyle => "text/yaml",
                MetadataBlockKind::PlusesStyle => "text/toml",
            };
            set_attr(doc, opened.elements[0], "type", mime);
            opened
        }
        #[allow(unreachable_patterns)]
        _ => single(doc, "span"),
    }
}
