//! Match tree to document tree.
//!
//! One constructor per match shape, plus the work that spans shapes:
//! attribute merging, list nesting, image/link fusion and collecting the
//! link aliases a document defines.

use std::collections::HashMap;
use std::iter::Peekable;
use std::vec::IntoIter;

use textile_grammar::{
    AttributeFragment, BlockMatch, DefinitionMatch, InlineMatch, ListItemMatch, PhraseKind,
    TableRowMatch,
};

use crate::ast::{AttrValue, Attributes, Child, Document, Node, NodeKind};

/// Builds a [`Document`] from block matches.
#[derive(Debug, Default)]
pub struct Transform {
    link_aliases: HashMap<String, String>,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform a whole document.
    pub fn document(mut self, blocks: Vec<BlockMatch>) -> Document {
        let children: Vec<Node> = blocks
            .into_iter()
            .filter_map(|block| self.block(block))
            .collect();
        tracing::debug!(
            nodes = children.len(),
            aliases = self.link_aliases.len(),
            "transformed textile document"
        );
        Document {
            children,
            link_aliases: self.link_aliases,
        }
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Alias blocks register their entries and produce no node.
    fn block(&mut self, block: BlockMatch) -> Option<Node> {
        let node = match block {
            BlockMatch::Heading {
                level,
                attributes,
                content,
            } => Node::new(NodeKind::Heading(level))
                .with_attributes(merge(&attributes))
                .with_children(self.content(content)),
            BlockMatch::Div {
                attributes,
                content,
            } => Node::new(NodeKind::Div)
                .with_attributes(merge(&attributes))
                .with_children(self.content(content)),
            BlockMatch::Paragraph {
                attributes,
                content,
                open_quote,
            } => Node::new(NodeKind::Paragraph { open_quote })
                .with_attributes(merge(&attributes))
                .with_children(self.content(content)),
            BlockMatch::Notextile(text) => Node::new(NodeKind::Notextile).with_text(text),
            BlockMatch::Blockquote {
                attributes,
                cite,
                paragraphs,
            } => {
                let attributes = merge(&attributes);
                let paragraphs: Vec<Child> = paragraphs
                    .into_iter()
                    .map(|paragraph| {
                        Child::Node(
                            Node::new(NodeKind::Paragraph {
                                open_quote: paragraph.open_quote,
                            })
                            .with_attributes(attributes.clone())
                            .with_children(self.content(paragraph.content)),
                        )
                    })
                    .collect();
                let mut quote_attributes = attributes;
                if let Some(cite) = cite {
                    quote_attributes.set("cite", cite);
                }
                Node::new(NodeKind::Blockquote)
                    .with_attributes(quote_attributes)
                    .with_children(paragraphs)
            }
            BlockMatch::BlockCode { attributes, text } => Node::new(NodeKind::BlockCode)
                .with_attributes(merge(&attributes))
                .with_text(text),
            BlockMatch::Pre { attributes, text } => Node::new(NodeKind::Pre { open_tag: None })
                .with_attributes(merge(&attributes))
                .with_text(text),
            BlockMatch::PreTag { open_tag, text } => Node::new(NodeKind::Pre {
                open_tag: Some(open_tag),
            })
            .with_text(text),
            BlockMatch::Footnote {
                number,
                attributes,
                content,
            } => Node::new(NodeKind::Footnote { number })
                .with_attributes(merge(&attributes))
                .with_children(self.content(content)),
            BlockMatch::Table { attributes, rows } => Node::new(NodeKind::Table)
                .with_attributes(merge(&attributes))
                .with_children(
                    rows.into_iter()
                        .map(|row| Child::Node(self.table_row(row)))
                        .collect(),
                ),
            BlockMatch::HorizontalRule => Node::new(NodeKind::HorizontalRule),
            BlockMatch::LinkAliases(aliases) => {
                for (name, url) in aliases {
                    tracing::trace!(%name, %url, "registered link alias");
                    self.link_aliases.insert(name, url);
                }
                return None;
            }
            BlockMatch::DefinitionList(definitions) => Node::new(NodeKind::DefinitionList)
                .with_children(
                    definitions
                        .into_iter()
                        .flat_map(|definition| self.definition(definition))
                        .collect(),
                ),
            BlockMatch::List(items) => self.list(items),
        };
        Some(node)
    }

    fn table_row(&self, row: TableRowMatch) -> Node {
        let cells: Vec<Child> = row
            .cells
            .into_iter()
            .map(|cell| {
                let kind = if cell.header {
                    NodeKind::TableHeader
                } else {
                    NodeKind::TableData
                };
                Child::Node(
                    Node::new(kind)
                        .with_attributes(merge(&cell.attributes))
                        .with_children(self.content(cell.content)),
                )
            })
            .collect();
        Node::new(NodeKind::TableRow)
            .with_attributes(merge(&row.attributes))
            .with_children(cells)
    }

    fn definition(&self, definition: DefinitionMatch) -> [Child; 2] {
        [
            Node::new(NodeKind::DefinitionTerm)
                .with_children(self.content(definition.term))
                .into(),
            Node::new(NodeKind::Definition)
                .with_children(self.content(definition.definition))
                .into(),
        ]
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Nest flat list items by marker depth.
    fn list(&self, items: Vec<ListItemMatch>) -> Node {
        let depth = items.iter().map(marker_depth).min().unwrap_or(1);
        let mut items = items.into_iter().peekable();
        self.list_level(&mut items, depth)
    }

    /// One list at `depth`. Deeper items nest a list inside the previous
    /// item, or inside an empty item when there is none; a shallower item
    /// ends this list.
    fn list_level(&self, items: &mut Peekable<IntoIter<ListItemMatch>>, depth: usize) -> Node {
        let kind = match items.peek().and_then(|item| item.marker.chars().last()) {
            Some('#') => NodeKind::OrderedList,
            _ => NodeKind::UnorderedList,
        };
        let mut list = Node::new(kind);

        while let Some(item_depth) = items.peek().map(marker_depth) {
            if item_depth < depth {
                break;
            }
            if item_depth > depth {
                let nested = self.list_level(items, item_depth);
                match list.children.last_mut() {
                    Some(Child::Node(item)) if item.kind == NodeKind::ListItem => {
                        item.children.push(nested.into())
                    }
                    _ => list.children.push(
                        Node::new(NodeKind::ListItem)
                            .with_children(vec![nested.into()])
                            .into(),
                    ),
                }
                continue;
            }
            let Some(item) = items.next() else { break };
            list.children.push(
                Node::new(NodeKind::ListItem)
                    .with_attributes(merge(&item.attributes))
                    .with_children(self.content(item.content))
                    .into(),
            );
        }
        list
    }

    // =========================================================================
    // Inline content
    // =========================================================================

    fn content(&self, matches: Vec<InlineMatch>) -> Vec<Child> {
        matches.into_iter().map(|m| self.inline(m)).collect()
    }

    fn inline(&self, inline: InlineMatch) -> Child {
        let node = match inline {
            InlineMatch::Text(text) => return Child::Text(text),
            InlineMatch::LineBreak => Node::new(NodeKind::LineBreak),
            InlineMatch::Phrase {
                kind,
                attributes,
                content,
            } => Node::new(phrase_kind(kind))
                .with_attributes(merge(&attributes))
                .with_children(self.content(content)),
            InlineMatch::Code(text) => Node::new(NodeKind::Code { open_tag: None }).with_text(text),
            InlineMatch::CodeTag { open_tag, text } => Node::new(NodeKind::Code {
                open_tag: Some(open_tag),
            })
            .with_text(text),
            InlineMatch::Link {
                attributes,
                content,
                title,
                href,
            } => {
                let mut map = merge(&attributes);
                map.set("href", href);
                if let Some(title) = title {
                    map.set("title", title);
                }
                Node::new(NodeKind::Link)
                    .with_attributes(map)
                    .with_children(self.content(content))
            }
            InlineMatch::Image {
                attributes,
                src,
                alt,
                href,
            } => image(&attributes, src, alt, href),
            InlineMatch::FootnoteReference(number) => {
                Node::new(NodeKind::FootnoteReference { number })
            }
            InlineMatch::Quoted(content) => {
                Node::new(NodeKind::DoubleQuotedPhrase).with_children(self.content(content))
            }
            InlineMatch::ForcedQuote(content) => {
                Node::new(NodeKind::ForcedQuote).with_children(self.content(content))
            }
            InlineMatch::Parenthetical(content) => {
                Node::new(NodeKind::Parenthetical).with_children(self.content(content))
            }
            InlineMatch::Entity(literal) => Node::new(NodeKind::Entity).with_text(literal),
            InlineMatch::Dimension(text) => Node::new(NodeKind::Dimension).with_text(text),
            InlineMatch::Caps(caps) => Node::new(NodeKind::Caps).with_text(caps),
            InlineMatch::Acronym { caps, expansion } => {
                let mut attributes = Attributes::new();
                attributes.set("title", expansion);
                Node::new(NodeKind::Acronym)
                    .with_attributes(attributes)
                    .with_children(vec![Node::new(NodeKind::Caps).with_text(caps).into()])
            }
            InlineMatch::HtmlTag(tag) => Node::new(NodeKind::HtmlTag).with_text(tag),
            InlineMatch::Notextile(text) => Node::new(NodeKind::Notextile).with_text(text),
        };
        Child::Node(node)
    }
}

/// An image, wrapped in a link when it has a target.
fn image(
    attributes: &[AttributeFragment],
    src: String,
    alt: Option<String>,
    href: Option<String>,
) -> Node {
    let mut map = merge(attributes);
    map.set("src", src);
    if let Some(alt) = alt {
        map.set("alt", alt);
    }
    if let Some(href) = href {
        map.set("href", href);
    }

    let href = map.remove("href");
    let image = Node::new(NodeKind::Image).with_attributes(map);
    match href {
        Some(AttrValue::Text(href)) => {
            let mut link = Attributes::new();
            link.set("href", href);
            Node::new(NodeKind::Link)
                .with_attributes(link)
                .with_children(vec![image.into()])
        }
        _ => image,
    }
}

/// Merge attribute fragments, in order, into one map.
pub fn merge(fragments: &[AttributeFragment]) -> Attributes {
    let mut attributes = Attributes::new();
    for fragment in fragments {
        match fragment {
            AttributeFragment::Class(class) => {
                attributes.merge("class", AttrValue::Text(class.clone()))
            }
            AttributeFragment::Id(id) => attributes.merge("id", AttrValue::Text(id.clone())),
            AttributeFragment::ClassAndId { class, id } => {
                attributes.merge("class", AttrValue::Text(class.clone()));
                attributes.merge("id", AttrValue::Text(id.clone()));
            }
            AttributeFragment::Style(properties) => {
                attributes.merge("style", AttrValue::Style(properties.clone()))
            }
            AttributeFragment::Language(lang) => {
                attributes.merge("lang", AttrValue::Text(lang.clone()))
            }
        }
    }
    attributes
}

fn marker_depth(item: &ListItemMatch) -> usize {
    item.marker.chars().count()
}

fn phrase_kind(kind: PhraseKind) -> NodeKind {
    match kind {
        PhraseKind::Strong => NodeKind::Strong,
        PhraseKind::Emphasis => NodeKind::Emphasis,
        PhraseKind::Bold => NodeKind::Bold,
        PhraseKind::Italic => NodeKind::Italic,
        PhraseKind::Insert => NodeKind::Insert,
        PhraseKind::Delete => NodeKind::Delete,
        PhraseKind::Superscript => NodeKind::Superscript,
        PhraseKind::Subscript => NodeKind::Subscript,
        PhraseKind::Span => NodeKind::Span,
        PhraseKind::Citation => NodeKind::Citation,
    }
}
