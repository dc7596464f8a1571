//! Raw match tree produced by the grammars.
//!
//! Every variant corresponds to exactly one grammar rule. The tree is
//! ephemeral: `textile-parser` consumes it whole and turns it into the
//! document tree, so nothing here carries rendering decisions.

/// One attribute declaration exactly as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeFragment {
    /// `(big red)` or `.big`
    Class(String),
    /// `(#main)` or `#main`
    Id(String),
    /// `(big#main)`
    ClassAndId { class: String, id: String },
    /// `{color:red}`, alignment (`align`) and padding shorthands
    Style(Vec<(String, String)>),
    /// `[en]`
    Language(String),
}

/// The emphasis family, one kind per delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhraseKind {
    /// `*text*`
    Strong,
    /// `_text_`
    Emphasis,
    /// `**text**`
    Bold,
    /// `__text__`
    Italic,
    /// `+text+`
    Insert,
    /// `-text-`
    Delete,
    /// `^text^`
    Superscript,
    /// `~text~`
    Subscript,
    /// `%text%`
    Span,
    /// `??text??`
    Citation,
}

impl PhraseKind {
    /// Delimiters in the order they are tried: doubled ones first.
    pub const ORDERED: [(&'static str, PhraseKind); 10] = [
        ("**", PhraseKind::Bold),
        ("__", PhraseKind::Italic),
        ("??", PhraseKind::Citation),
        ("*", PhraseKind::Strong),
        ("_", PhraseKind::Emphasis),
        ("+", PhraseKind::Insert),
        ("-", PhraseKind::Delete),
        ("^", PhraseKind::Superscript),
        ("~", PhraseKind::Subscript),
        ("%", PhraseKind::Span),
    ];
}

/// A span recognized inside block content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineMatch {
    /// Literal characters with no markup meaning.
    Text(String),
    /// A newline inside block content.
    LineBreak,
    Phrase {
        kind: PhraseKind,
        attributes: Vec<AttributeFragment>,
        content: Vec<InlineMatch>,
    },
    /// `@code@`
    Code(String),
    /// `<code class="x">…</code>`, opening tag kept verbatim.
    CodeTag { open_tag: String, text: String },
    Link {
        attributes: Vec<AttributeFragment>,
        content: Vec<InlineMatch>,
        title: Option<String>,
        href: String,
    },
    Image {
        attributes: Vec<AttributeFragment>,
        src: String,
        alt: Option<String>,
        href: Option<String>,
    },
    /// Digits of `word[1]`.
    FootnoteReference(String),
    /// `"quoted phrase"`
    Quoted(Vec<InlineMatch>),
    /// `[forced]`
    ForcedQuote(Vec<InlineMatch>),
    /// `(aside)`
    Parenthetical(Vec<InlineMatch>),
    /// A typographic substitution, holding the matched literal.
    Entity(String),
    /// A number with an optional `'`/`"` unit between multiplication signs.
    Dimension(String),
    Caps(String),
    Acronym { caps: String, expansion: String },
    /// Raw HTML tag or comment.
    HtmlTag(String),
    /// `==raw==` or `<notextile>raw</notextile>`
    Notextile(String),
}

/// A list line before nesting is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemMatch {
    /// The `*`/`#` run, e.g. `"*#"`.
    pub marker: String,
    pub attributes: Vec<AttributeFragment>,
    pub content: Vec<InlineMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRowMatch {
    pub attributes: Vec<AttributeFragment>,
    pub cells: Vec<TableCellMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCellMatch {
    pub header: bool,
    pub attributes: Vec<AttributeFragment>,
    pub content: Vec<InlineMatch>,
}

/// Paragraph content inside a blockquote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphMatch {
    pub content: Vec<InlineMatch>,
    /// Content opens with a `"` that no quoted phrase closed.
    pub open_quote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionMatch {
    pub term: Vec<InlineMatch>,
    pub definition: Vec<InlineMatch>,
}

/// A top-level block element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockMatch {
    Heading {
        level: u8,
        attributes: Vec<AttributeFragment>,
        content: Vec<InlineMatch>,
    },
    Div {
        attributes: Vec<AttributeFragment>,
        content: Vec<InlineMatch>,
    },
    Paragraph {
        attributes: Vec<AttributeFragment>,
        content: Vec<InlineMatch>,
        /// Content opens with a `"` that no quoted phrase closed.
        open_quote: bool,
    },
    Notextile(String),
    Blockquote {
        attributes: Vec<AttributeFragment>,
        cite: Option<String>,
        paragraphs: Vec<ParagraphMatch>,
    },
    BlockCode {
        attributes: Vec<AttributeFragment>,
        text: String,
    },
    Pre {
        attributes: Vec<AttributeFragment>,
        text: String,
    },
    PreTag {
        open_tag: String,
        text: String,
    },
    Footnote {
        number: String,
        attributes: Vec<AttributeFragment>,
        content: Vec<InlineMatch>,
    },
    Table {
        attributes: Vec<AttributeFragment>,
        rows: Vec<TableRowMatch>,
    },
    HorizontalRule,
    /// `[name]url` lines.
    LinkAliases(Vec<(String, String)>),
    DefinitionList(Vec<DefinitionMatch>),
    List(Vec<ListItemMatch>),
}
