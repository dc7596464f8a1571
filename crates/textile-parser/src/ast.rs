//! Document tree for Textile.
//!
//! The node kinds are closed: every grammar construct maps to exactly one
//! kind and the formatter matches over all of them.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A converted document: its blocks and the link aliases it defines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub children: Vec<Node>,
    /// `[name]url` definitions, keyed by name.
    pub link_aliases: HashMap<String, String>,
}

/// A tree node. Owns its children exclusively.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub children: Vec<Child>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_children(mut self, children: Vec<Child>) -> Self {
        self.children = children;
        self
    }

    /// A node holding a single text child.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_children(vec![Child::Text(text.into())])
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Node(node) => out.push_str(&node.text()),
            }
        }
        out
    }
}

/// A child is raw text or another node.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Text(String),
    Node(Node),
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

/// Node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    // Blocks
    /// `h1` to `h6`.
    Heading(u8),
    Div,
    Paragraph {
        /// Opens with a quote no later quote closed; the first escaped
        /// quote is curled when rendered.
        open_quote: bool,
    },
    Blockquote,
    DefinitionList,
    DefinitionTerm,
    Definition,
    OrderedList,
    UnorderedList,
    ListItem,
    Table,
    TableRow,
    TableHeader,
    TableData,
    Footnote {
        number: String,
    },
    /// `pre.` block, or a `<pre>` tag written verbatim.
    Pre {
        open_tag: Option<String>,
    },
    /// `bc.` block.
    BlockCode,
    HorizontalRule,

    // Passthrough
    Notextile,
    HtmlTag,

    // Inline
    Link,
    Image,
    FootnoteReference {
        number: String,
    },
    /// `@code@`, or a `<code>` tag written verbatim.
    Code {
        open_tag: Option<String>,
    },
    Caps,
    Acronym,
    DoubleQuotedPhrase,
    ForcedQuote,
    Parenthetical,
    Dimension,
    Entity,
    LineBreak,

    // Emphasis family
    Strong,
    Emphasis,
    Bold,
    Italic,
    Insert,
    Delete,
    Superscript,
    Subscript,
    Span,
    Citation,
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// An attribute value: plain text, or the property list of `style`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Style(Vec<(String, String)>),
}

/// Ordered attribute map.
///
/// Keys are unique. Merging `class` appends to the existing class list and
/// merging `style` updates properties one by one; any other key is
/// overwritten in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The value of `key` when it is plain text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            AttrValue::Text(text) => Some(text),
            AttrValue::Style(_) => None,
        }
    }

    /// Set `key`, replacing any previous value in its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = AttrValue::Text(value.into());
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge one declaration into the map.
    pub fn merge(&mut self, key: impl Into<String>, value: AttrValue) {
        let key = key.into();
        let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) else {
            self.entries.push((key, value));
            return;
        };
        match (&mut entry.1, value) {
            (AttrValue::Text(existing), AttrValue::Text(addition)) if key == "class" => {
                existing.push(' ');
                existing.push_str(&addition);
            }
            (AttrValue::Style(existing), AttrValue::Style(properties)) => {
                for (name, value) in properties {
                    match existing.iter_mut().find(|(n, _)| *n == name) {
                        Some(property) => property.1 = value,
                        None => existing.push((name, value)),
                    }
                }
            }
            (slot, value) => *slot = value,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
