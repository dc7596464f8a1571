//! Textile Grammar
//!
//! Recognizes Textile source as a tree of raw matches: block elements,
//! the inline spans inside them, and the attribute declarations attached
//! to both. Parsing is ordered choice with backtracking; the first
//! alternative that matches wins.
//!
//! # Example
//!
//! ```
//! use textile_grammar::{BlockMatch, InlineMatch};
//!
//! let blocks = textile_grammar::parse("Hello").unwrap();
//! assert_eq!(
//!     blocks,
//!     vec![BlockMatch::Paragraph {
//!         attributes: vec![],
//!         content: vec![InlineMatch::Text("Hello".into())],
//!         open_quote: false,
//!     }]
//! );
//! ```

mod attributes;
mod block;
mod inline;
pub mod matches;
pub mod scanner;

pub use matches::{
    AttributeFragment, BlockMatch, DefinitionMatch, InlineMatch, ListItemMatch, ParagraphMatch,
    PhraseKind, TableCellMatch, TableRowMatch,
};
pub use scanner::Scanner;

/// Syntax error at the furthest position any rule reached.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    /// Character offset into the source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    /// Alternatives that failed at `offset`, sorted.
    pub expected: Vec<String>,
}

/// Parse Textile source into block matches.
pub fn parse(source: &str) -> Result<Vec<BlockMatch>, SyntaxError> {
    Scanner::parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let error = parse("a <notextile>b").unwrap_err();
        assert_eq!(error.line, 1);
        assert_eq!(error.column, 15);
        assert_eq!(
            error.to_string(),
            "Syntax error at line 1, column 15: unexpected end of input, expected one of \"</notextile>\""
        );
    }

    #[test]
    fn test_error_line_and_column() {
        let error = parse("ok\n\nfine <notextile>\nmore").unwrap_err();
        assert_eq!(error.offset, 25);
        assert_eq!(error.line, 4);
        assert_eq!(error.column, 5);
    }
}
