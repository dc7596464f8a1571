//! End-to-end conversions through the public entry point.

use pretty_assertions::assert_eq;
use textile_html::{convert, Options};

fn html(source: &str) -> String {
    convert(source, &Options::default()).unwrap()
}

fn sorted() -> Options {
    Options {
        sort_attributes: true,
        ..Options::default()
    }
}

// =============================================================================
// Links and aliases
// =============================================================================

#[test]
fn test_link_in_sentence() {
    assert_eq!(
        html("Search \"Google\":http://google.com."),
        "<p>Search <a href=\"http://google.com\">Google</a>.</p>"
    );
}

#[test]
fn test_configured_alias() {
    let mut options = Options::default();
    options
        .link_aliases
        .insert("foo".to_string(), "http://example.com".to_string());
    assert_eq!(
        convert("\"Foo\":foo", &options).unwrap(),
        "<p><a href=\"http://example.com\">Foo</a></p>"
    );
}

#[test]
fn test_alias_block_renders_nothing() {
    assert_eq!(
        html("[docs]http://docs.example\n\nRead \"the docs\":docs"),
        "<p>Read <a href=\"http://docs.example\">the docs</a></p>"
    );
}

#[test]
fn test_aliases_do_not_leak_between_conversions() {
    let options = Options::default();
    let first = convert("[a]http://a.example\n\n\"x\":a", &options).unwrap();
    let second = convert("\"x\":a", &options).unwrap();
    assert_eq!(first, "<p><a href=\"http://a.example\">x</a></p>");
    assert_eq!(second, "<p><a href=\"a\">x</a></p>");
}

#[test]
fn test_link_title_escaped_once() {
    assert_eq!(
        html("\"Fish & Chips (A & B)\":http://x.example"),
        "<p><a href=\"http://x.example\" title=\"A &amp; B\">Fish &amp; Chips</a></p>"
    );
}

// =============================================================================
// Lists
// =============================================================================

#[test]
fn test_nested_list() {
    assert_eq!(
        html("* a\n** b\n"),
        "<ul>\n\t<li>a\n\t<ul>\n\t\t<li>b</li>\n\t</ul></li>\n</ul>"
    );
}

#[test]
fn test_list_between_paragraphs() {
    assert_eq!(
        html("Before\n\n# one\n# two\n\nAfter"),
        "<p>Before</p>\n<ol>\n\t<li>one</li>\n\t<li>two</li>\n</ol>\n<p>After</p>"
    );
}

// =============================================================================
// Escaping
// =============================================================================

#[test]
fn test_apostrophe_depends_on_context() {
    assert_eq!(html("it's"), "<p>it&#8217;s</p>");
    assert_eq!(html("bc. it's"), "<pre><code>it&#39;s</code></pre>");
}

#[test]
fn test_style_value_escaped_once() {
    assert_eq!(
        html("p{font:a&b}. x"),
        "<p style=\"font:a&amp;b;\">x</p>"
    );
}

#[test]
fn test_markup_characters_escaped() {
    assert_eq!(html("1 < 2 & 3 > 2"), "<p>1 &lt; 2 &amp; 3 &gt; 2</p>");
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn test_shorthand_attributes_keep_written_order() {
    assert_eq!(
        html("p#main.big. x"),
        "<p id=\"main\" class=\"big\">x</p>"
    );
    assert_eq!(
        convert("p#main.big. x", &sorted()).unwrap(),
        "<p class=\"big\" id=\"main\">x</p>"
    );
}

#[test]
fn test_parenthesized_class_and_id() {
    assert_eq!(
        html("p(big#main). x"),
        "<p class=\"big\" id=\"main\">x</p>"
    );
}

// =============================================================================
// Options and errors
// =============================================================================

#[test]
fn test_hard_breaks_off() {
    let options = Options {
        hard_breaks: false,
        ..Options::default()
    };
    assert_eq!(convert("a\nb", &options).unwrap(), "<p>a\nb</p>");
}

#[test]
fn test_unterminated_notextile_is_an_error() {
    let error = convert("<notextile>\n", &Options::default()).unwrap_err();
    assert!(error.to_string().starts_with("Syntax error at line"));
}

#[test]
fn test_empty_document() {
    assert_eq!(html(""), "");
}

#[test]
fn test_indented_paragraph_is_trimmed() {
    assert_eq!(html("  hello  "), "<p>hello</p>");
}

// =============================================================================
// Large inputs
// =============================================================================

#[test]
fn test_deeply_unclosed_markup_converts() {
    let parentheses = "(".repeat(10_000);
    assert_eq!(html(&parentheses), format!("<p>{parentheses}</p>"));

    let phrases = "*a ".repeat(2_000);
    assert_eq!(html(&phrases), format!("<p>{}</p>", phrases.trim_end()));
}

#[test]
fn test_long_whitespace_run_inside_line() {
    let spaces = " ".repeat(20_000);
    assert_eq!(html(&format!("a{spaces}b")), format!("<p>a{spaces}b</p>"));
}
