//! Document tree the search engine operates on

mod builder;
mod html;
mod markdown;
mod node;
mod tree;

pub use builder::DocumentBuilder;
pub use node::{Node, NodeId, NodeKind};
pub use tree::{Children, Document, DocumentError, DocumentResult};
