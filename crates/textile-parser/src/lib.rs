//! Textile Parser
//!
//! Turns Textile source into a typed document tree. The grammar produces
//! raw matches; [`Transform`] maps them onto the closed set of node kinds,
//! merging attribute declarations and nesting lists along the way.
//!
//! # Example
//!
//! ```
//! use textile_parser::{Child, NodeKind};
//!
//! let document = textile_parser::parse("h1. Title").unwrap();
//! assert_eq!(document.children[0].kind, NodeKind::Heading(1));
//! assert_eq!(document.children[0].children, vec![Child::Text("Title".into())]);
//! ```

pub mod ast;
pub mod transform;

pub use ast::{AttrValue, Attributes, Child, Document, Node, NodeKind};
pub use textile_grammar::SyntaxError;
pub use transform::Transform;

/// Parse Textile source into a document tree.
pub fn parse(source: &str) -> Result<Document, SyntaxError> {
    let blocks = textile_grammar::parse(source)?;
    Ok(Transform::new().document(blocks))
}
