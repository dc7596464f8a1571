//! Textile HTML
//!
//! Renders a Textile document tree as an HTML fragment, and exposes the
//! one-call [`convert`] entry point over the whole pipeline.
//!
//! ```text
//! source → grammar → transform → Document → Formatter → html
//! ```
//!
//! # Example
//!
//! ```
//! use textile_html::{convert, Options};
//!
//! let html = convert("*Hello*", &Options::default()).unwrap();
//! assert_eq!(html, "<p><strong>Hello</strong></p>");
//! ```

pub mod attributes;
pub mod escape;
pub mod html;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use textile_parser::Document;

pub use html::Formatter;
pub use textile_parser::SyntaxError;

/// Conversion options. Fixed for the duration of one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Newlines inside blocks become `<br />`.
    pub hard_breaks: bool,
    /// Link targets resolved by name. Aliases defined in the document win.
    pub link_aliases: HashMap<String, String>,
    /// Sort attributes and style properties by name.
    pub sort_attributes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            link_aliases: HashMap::new(),
            sort_attributes: false,
        }
    }
}

/// Convert Textile source to an HTML fragment.
pub fn convert(text: &str, options: &Options) -> Result<String, SyntaxError> {
    let document = textile_parser::parse(text)?;
    Ok(render(&document, options))
}

/// Render an already parsed document.
pub fn render(document: &Document, options: &Options) -> String {
    let html = Formatter::new(options, &document.link_aliases).render(document);
    tracing::debug!(bytes = html.len(), "rendered textile document");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert!(options.hard_breaks);
        assert!(!options.sort_attributes);
        assert!(options.link_aliases.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert("", &Options::default()).unwrap(), "");
        assert_eq!(convert("\n\n  \n", &Options::default()).unwrap(), "");
    }

    #[test]
    fn test_convert_reports_syntax_error() {
        let error = convert("<notextile>\nunclosed", &Options::default()).unwrap_err();
        assert!(error.to_string().starts_with("Syntax error at line 2"));
    }
}
