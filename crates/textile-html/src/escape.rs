//! Escaping and typographic substitution.

/// Which characters a piece of text is escaped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeContext {
    /// Running text: markup characters, newlines and curled apostrophes.
    All,
    /// Preformatted and code text: markup characters and quotes only.
    Pre,
    /// Attribute values.
    Attribute,
}

/// Literal substitutions. Entity nodes look their literal up here.
const ESCAPE_MAP: [(&str, &str); 16] = [
    ("<", "&lt;"),
    (">", "&gt;"),
    ("&", "&amp;"),
    ("\"", "&quot;"),
    ("\n", "<br />\n"),
    ("'", "&#39;"),
    ("--", "&#8212;"),
    (" -", " &#8211;"),
    ("x", "&#215;"),
    ("...", "&#8230;"),
    ("(TM)", "&#8482;"),
    ("(tm)", "&#8482;"),
    ("(C)", "&#169;"),
    ("(c)", "&#169;"),
    ("(R)", "&#174;"),
    ("(r)", "&#174;"),
];

/// The replacement for an entity literal, if it has one.
pub fn entity(literal: &str) -> Option<&'static str> {
    ESCAPE_MAP
        .iter()
        .find(|(from, _)| *from == literal)
        .map(|(_, to)| *to)
}

/// Escape `text` for `context`. With `hard_breaks` off, newlines in running
/// text stay bare newlines.
pub fn escape(text: &str, context: EscapeContext, hard_breaks: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match (ch, context) {
            ('<', _) => out.push_str("&lt;"),
            ('>', _) => out.push_str("&gt;"),
            ('&', _) => out.push_str("&amp;"),
            ('"', _) => out.push_str("&quot;"),
            ('\'', EscapeContext::All) => out.push_str("&#8217;"),
            ('\'', EscapeContext::Pre) => out.push_str("&#39;"),
            ('\n', EscapeContext::All) if hard_breaks => out.push_str("<br />\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Prime marks for the unit quotes of a dimension.
pub fn dimension(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\'' => out.push_str("&#8242;"),
            '"' => out.push_str("&#8243;"),
            _ => out.push(ch),
        }
    }
    out
}
