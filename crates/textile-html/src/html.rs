//! HTML formatter.
//!
//! Walks the document tree depth-first. One render arm per node kind; the
//! list nesting depth and the ancestor stack live only as long as one
//! [`Formatter`].

use std::collections::HashMap;

use textile_parser::{Attributes, Child, Document, Node, NodeKind};

use crate::attributes::{html_attributes, Placement};
use crate::escape::{self, escape, EscapeContext};
use crate::Options;

/// Renders one document.
pub struct Formatter<'a> {
    options: &'a Options,
    link_aliases: HashMap<String, String>,
    list_nesting: usize,
    stack: Vec<NodeKind>,
}

impl<'a> Formatter<'a> {
    /// A formatter resolving links through the configured aliases, with
    /// `document_aliases` taking precedence.
    pub fn new(options: &'a Options, document_aliases: &HashMap<String, String>) -> Self {
        let mut link_aliases = options.link_aliases.clone();
        link_aliases.extend(
            document_aliases
                .iter()
                .map(|(name, url)| (name.clone(), url.clone())),
        );
        Self {
            options,
            link_aliases,
            list_nesting: 0,
            stack: Vec::new(),
        }
    }

    /// Kinds of the nodes enclosing the one being rendered, outermost first.
    pub fn ancestors(&self) -> &[NodeKind] {
        &self.stack
    }

    /// Render a document: each block on its own line, the whole trimmed.
    pub fn render(&mut self, document: &Document) -> String {
        let mut out = String::new();
        for block in &document.children {
            out.push_str(&self.node(block));
            out.push('\n');
        }
        out.trim().to_string()
    }

    fn attrs(&self, attributes: &Attributes) -> String {
        html_attributes(attributes, Placement::Text, self.options.sort_attributes)
    }

    /// `<tag attrs>inner</tag>`
    fn element(&mut self, tag: &str, node: &Node) -> String {
        let inner = self.inner(node, false, EscapeContext::All);
        format!("<{tag}{}>{inner}</{tag}>", self.attrs(&node.attributes))
    }

    /// Rendered children of `node`, each followed by a newline when `block`.
    fn inner(&mut self, node: &Node, block: bool, context: EscapeContext) -> String {
        let mut out = String::new();
        self.stack.push(node.kind.clone());
        for child in &node.children {
            match child {
                Child::Text(text) => {
                    out.push_str(&escape(text, context, self.options.hard_breaks))
                }
                Child::Node(child) => out.push_str(&self.node(child)),
            }
            if block {
                out.push('\n');
            }
        }
        self.stack.pop();
        out
    }

    fn node(&mut self, node: &Node) -> String {
        match &node.kind {
            NodeKind::Heading(level) => self.element(&format!("h{level}"), node),
            NodeKind::Div => self.element("div", node),
            NodeKind::Paragraph { open_quote } => {
                let mut inner = self.inner(node, false, EscapeContext::All);
                if *open_quote {
                    if let Some(rest) = inner.strip_prefix("&quot;") {
                        inner = format!("&#8220;{rest}");
                    }
                }
                format!("<p{}>{inner}</p>", self.attrs(&node.attributes))
            }
            NodeKind::Blockquote => self.block_container("blockquote", node),
            NodeKind::DefinitionList => self.block_container("dl", node),
            NodeKind::DefinitionTerm => {
                format!("\t<dt>{}</dt>", self.inner(node, false, EscapeContext::All))
            }
            NodeKind::Definition => {
                format!("\t<dd>{}</dd>", self.inner(node, false, EscapeContext::All))
            }
            NodeKind::OrderedList => self.list("ol", node),
            NodeKind::UnorderedList => self.list("ul", node),
            NodeKind::ListItem => {
                let indent = "\t".repeat(self.list_nesting);
                let inner = self.inner(node, false, EscapeContext::All);
                format!("{indent}<li{}>{inner}", self.attrs(&node.attributes))
            }
            NodeKind::Table => {
                let inner = self.inner(node, false, EscapeContext::All);
                format!("<table{}>\n{inner}</table>", self.attrs(&node.attributes))
            }
            NodeKind::TableRow => {
                let inner = self.inner(node, false, EscapeContext::All);
                format!("\t<tr{}>\n{inner}\t</tr>\n", self.attrs(&node.attributes))
            }
            NodeKind::TableHeader => format!("\t\t{}\n", self.element("th", node)),
            NodeKind::TableData => format!("\t\t{}\n", self.element("td", node)),
            NodeKind::Footnote { number } => self.footnote(number, node),
            NodeKind::FootnoteReference { number } => format!(
                "<sup class=\"footnote\" id=\"fnr{number}\"><a href=\"#fn{number}\">{number}</a></sup>"
            ),
            NodeKind::Pre { open_tag } => self.preformatted("pre", open_tag.as_deref(), node),
            NodeKind::Code { open_tag } => self.preformatted("code", open_tag.as_deref(), node),
            NodeKind::BlockCode => format!(
                "<pre{}><code>{}</code></pre>",
                self.attrs(&node.attributes),
                escape(&node.text(), EscapeContext::Pre, self.options.hard_breaks)
            ),
            NodeKind::HorizontalRule => "<hr />".to_string(),
            NodeKind::Notextile | NodeKind::HtmlTag => node.text(),
            NodeKind::Link => self.link(node),
            NodeKind::Image => self.image(node),
            NodeKind::Caps => {
                let mut attributes = node.attributes.clone();
                attributes.set("class", "caps");
                let inner = self.inner(node, false, EscapeContext::All);
                format!("<span{}>{inner}</span>", self.attrs(&attributes))
            }
            NodeKind::Acronym => self.element("acronym", node),
            NodeKind::DoubleQuotedPhrase => {
                format!("&#8220;{}&#8221;", self.inner(node, false, EscapeContext::All))
            }
            NodeKind::ForcedQuote => {
                format!("[{}]", self.inner(node, false, EscapeContext::All))
            }
            NodeKind::Parenthetical => {
                format!("({})", self.inner(node, false, EscapeContext::All))
            }
            NodeKind::Dimension => escape::dimension(&node.text()),
            NodeKind::Entity => {
                let literal = node.text();
                escape::entity(&literal).map_or(literal, str::to_string)
            }
            NodeKind::LineBreak => {
                if self.options.hard_breaks {
                    "<br />\n".to_string()
                } else {
                    "\n".to_string()
                }
            }
            NodeKind::Strong => self.element("strong", node),
            NodeKind::Emphasis => self.element("em", node),
            NodeKind::Bold => self.element("b", node),
            NodeKind::Italic => self.element("i", node),
            NodeKind::Insert => self.element("ins", node),
            NodeKind::Delete => self.element("del", node),
            NodeKind::Superscript => self.element("sup", node),
            NodeKind::Subscript => self.element("sub", node),
            NodeKind::Span => self.element("span", node),
            NodeKind::Citation => self.element("cite", node),
        }
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Children each on their own line between the tags.
    fn block_container(&mut self, tag: &str, node: &Node) -> String {
        let inner = self.inner(node, true, EscapeContext::All);
        format!("<{tag}{}>\n{inner}</{tag}>", self.attrs(&node.attributes))
    }

    /// Items close lazily: `</li>` is written before the next item and at
    /// the end of the list, so a nested list stays inside its item.
    fn list(&mut self, tag: &str, node: &Node) -> String {
        let mut out = String::new();
        if self.list_nesting > 0 {
            out.push('\n');
        }
        out.push_str(&"\t".repeat(self.list_nesting));
        self.list_nesting += 1;
        out.push_str(&format!("<{tag}{}>\n", self.attrs(&node.attributes)));

        self.stack.push(node.kind.clone());
        for (index, child) in node.children.iter().enumerate() {
            match child {
                Child::Node(item) => {
                    if item.kind == NodeKind::ListItem && index > 0 {
                        out.push_str("</li>\n");
                    }
                    out.push_str(&self.node(item));
                }
                Child::Text(text) => {
                    out.push_str(&escape(text, EscapeContext::All, self.options.hard_breaks))
                }
            }
        }
        self.stack.pop();

        self.list_nesting -= 1;
        out.push_str("</li>\n");
        out.push_str(&"\t".repeat(self.list_nesting));
        out.push_str(&format!("</{tag}>"));
        out
    }

    // =========================================================================
    // Special elements
    // =========================================================================

    fn footnote(&mut self, number: &str, node: &Node) -> String {
        let mut attributes = node.attributes.clone();
        let class = match attributes.text("class") {
            Some(class) => format!("{class} footnote"),
            None => "footnote".to_string(),
        };
        attributes.set("class", class);
        attributes.set("id", format!("fn{number}"));
        let inner = self.inner(node, false, EscapeContext::All);
        format!(
            "<p{}><a href=\"#fnr{number}\"><sup>{number}</sup></a> {inner}</p>",
            self.attrs(&attributes)
        )
    }

    /// `pre` or `code`: the verbatim opening tag when one was written.
    fn preformatted(&mut self, tag: &str, open_tag: Option<&str>, node: &Node) -> String {
        let open = match open_tag {
            Some(open_tag) => open_tag.to_string(),
            None => format!("<{tag}{}>", self.attrs(&node.attributes)),
        };
        let inner = self.inner(node, false, EscapeContext::Pre);
        format!("{open}{inner}</{tag}>")
    }

    fn link(&mut self, node: &Node) -> String {
        let mut attributes = node.attributes.clone();
        if let Some(href) = attributes.text("href") {
            if let Some(target) = self.link_aliases.get(href) {
                tracing::trace!(alias = %href, %target, "resolved link alias");
                let target = target.clone();
                attributes.set("href", target);
            }
        }
        let inner = self.inner(node, false, EscapeContext::All);
        format!("<a{}>{inner}</a>", self.attrs(&attributes))
    }

    /// The title mirrors a non-empty alt; a missing alt renders empty.
    fn image(&self, node: &Node) -> String {
        let mut attributes = node.attributes.clone();
        let alt = attributes.text("alt").map(str::to_string);
        match alt {
            Some(alt) if !alt.is_empty() => attributes.set("title", alt),
            _ => attributes.set("alt", ""),
        }
        format!(
            "<img{} />",
            html_attributes(&attributes, Placement::Image, self.options.sort_attributes)
        )
    }
}
