//! Block grammar: segments a document into block elements.
//!
//! Every block ends at end of input or at a blank line. Signatures are tried
//! in a fixed order and the undecorated paragraph comes last, so plain text
//! always has a reading.

use crate::matches::{
    AttributeFragment, BlockMatch, DefinitionMatch, InlineMatch, ListItemMatch, ParagraphMatch,
    TableCellMatch, TableRowMatch,
};
use crate::scanner::{Boundary, Scanner};
use crate::SyntaxError;

/// Block signature names, longest first where one is a prefix of another.
const SIGNATURES: [&str; 9] = ["notextile", "table", "div", "pre", "bq", "bc", "fn", "h", "p"];

impl Scanner {
    pub(crate) fn document(&mut self) -> Result<Vec<BlockMatch>, SyntaxError> {
        let mut blocks = Vec::new();
        self.skip_blank_lines();
        while !self.is_at_end() {
            match self.block_element() {
                Some(block) => blocks.push(block),
                None => return Err(self.error()),
            }
            self.skip_blank_lines();
        }
        Ok(blocks)
    }

    fn block_element(&mut self) -> Option<BlockMatch> {
        self.attempt(Self::heading)
            .or_else(|| self.attempt(Self::div))
            .or_else(|| self.attempt(Self::notextile_block_tags))
            .or_else(|| self.attempt(Self::notextile_block))
            .or_else(|| self.attempt(Self::blockquote))
            .or_else(|| self.attempt(Self::block_code))
            .or_else(|| self.attempt(Self::pre))
            .or_else(|| self.attempt(Self::pre_tag))
            .or_else(|| self.attempt(Self::footnote))
            .or_else(|| self.attempt(Self::table))
            .or_else(|| self.attempt(Self::horizontal_rule))
            .or_else(|| self.attempt(Self::link_aliases))
            .or_else(|| self.attempt(Self::definition_list))
            .or_else(|| self.attempt(Self::list))
            .or_else(|| self.paragraph())
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// `. ` after a signature and its attributes.
    fn signature_end(&mut self) -> Option<()> {
        self.eat(". ").then_some(())
    }

    /// `. `, `.. `, `.:cite ` or `..:cite `; returns whether the block is
    /// extended and the cite url.
    fn extended_signature_end(&mut self) -> Option<(bool, Option<String>)> {
        if !self.eat(".") {
            return None;
        }
        let extended = self.eat_if(|c| c == '.').is_some();
        let cite = match self.eat_if(|c| c == ':') {
            Some(_) => Some(self.url()?),
            None => None,
        };
        self.eat(" ").then_some((extended, cite))
    }

    /// Any block signature starts here. Ends an extended block.
    fn signature(&mut self) -> Option<()> {
        let name = SIGNATURES.iter().find(|name| self.looking_at(name))?;
        self.pos += name.len();
        match *name {
            "h" => {
                self.eat_if(|c| ('1'..='6').contains(&c))?;
            }
            "fn" => {
                if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                    return None;
                }
            }
            _ => {}
        }
        self.block_attributes();
        self.eat_if(|c| c == '.')?;
        self.eat_if(|c| c == '.');
        matches!(self.peek(), Some(' ' | ':' | '\n')).then_some(())
    }

    /// Content that must not be empty, then the block end.
    fn block_body(&mut self) -> Option<Vec<InlineMatch>> {
        let content = self.block_content();
        if content.is_empty() {
            self.fail("content");
            return None;
        }
        self.block_end()?;
        Some(content)
    }

    /// Raw text up to the end of the block.
    fn raw_block(&mut self) -> String {
        let start = self.pos;
        while !self.at_block_end() {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    /// Raw text spanning blank lines, up to the next block signature.
    fn raw_extended_block(&mut self) -> String {
        let start = self.pos;
        loop {
            self.raw_block();
            let end = self.pos;
            self.block_end();
            self.skip_blank_lines();
            if self.is_at_end() || self.probe(Self::signature) {
                self.pos = end;
                return self.slice(start, end);
            }
        }
    }

    // =========================================================================
    // Headings, divs and paragraphs
    // =========================================================================

    /// `h2(attrs). content`
    fn heading(&mut self) -> Option<BlockMatch> {
        if !self.eat("h") {
            return None;
        }
        let level = self.eat_if(|c| ('1'..='6').contains(&c))?;
        let attributes = self.block_attributes();
        self.signature_end()?;
        let content = self.block_body()?;
        Some(BlockMatch::Heading {
            level: level.to_digit(10).map_or(1, |d| d as u8),
            attributes,
            content,
        })
    }

    /// `div(attrs). content`
    fn div(&mut self) -> Option<BlockMatch> {
        if !self.eat("div") {
            return None;
        }
        let attributes = self.block_attributes();
        self.signature_end()?;
        let content = self.block_body()?;
        Some(BlockMatch::Div {
            attributes,
            content,
        })
    }

    /// `p(attrs). content`, or bare content with its indentation dropped.
    fn paragraph(&mut self) -> Option<BlockMatch> {
        self.attempt(|s| {
            if !s.eat("p") {
                return None;
            }
            let attributes = s.block_attributes();
            s.signature_end()?;
            s.paragraph_with(attributes)
        })
        .or_else(|| {
            self.attempt(|s| {
                s.take_while(|c| c == ' ' || c == '\t');
                s.paragraph_with(Vec::new())
            })
        })
    }

    fn paragraph_with(&mut self, attributes: Vec<AttributeFragment>) -> Option<BlockMatch> {
        let ParagraphMatch {
            content,
            open_quote,
        } = self.paragraph_body()?;
        Some(BlockMatch::Paragraph {
            attributes,
            content,
            open_quote,
        })
    }

    /// Paragraph content, flagged when it opens a quote it never closes.
    fn paragraph_body(&mut self) -> Option<ParagraphMatch> {
        let content = self.block_body()?;
        let open_quote =
            matches!(content.first(), Some(InlineMatch::Text(text)) if text.starts_with('"'));
        Some(ParagraphMatch {
            content,
            open_quote,
        })
    }

    // =========================================================================
    // Passthrough and literal blocks
    // =========================================================================

    /// `<notextile>` on its own line, closed by `</notextile>` on its own line.
    fn notextile_block_tags(&mut self) -> Option<BlockMatch> {
        if !self.eat("<notextile>\n") {
            return None;
        }
        let text = self.until("\n</notextile>", false)?;
        self.block_end()?;
        Some(BlockMatch::Notextile(text))
    }

    /// `notextile. raw`
    fn notextile_block(&mut self) -> Option<BlockMatch> {
        if !self.eat("notextile. ") {
            return None;
        }
        let text = self.raw_block();
        self.block_end()?;
        Some(BlockMatch::Notextile(text))
    }

    /// `bc. code` or `bc.. code` spanning blank lines.
    fn block_code(&mut self) -> Option<BlockMatch> {
        if !self.eat("bc") {
            return None;
        }
        let attributes = self.block_attributes();
        let text = self.literal_body()?;
        Some(BlockMatch::BlockCode { attributes, text })
    }

    /// `pre. text` or `pre.. text` spanning blank lines.
    fn pre(&mut self) -> Option<BlockMatch> {
        if !self.eat("pre") {
            return None;
        }
        let attributes = self.block_attributes();
        let text = self.literal_body()?;
        Some(BlockMatch::Pre { attributes, text })
    }

    fn literal_body(&mut self) -> Option<String> {
        if !self.eat(".") {
            return None;
        }
        let extended = self.eat_if(|c| c == '.').is_some();
        if !self.eat(" ") {
            return None;
        }
        let text = if extended {
            self.raw_extended_block()
        } else {
            self.raw_block()
        };
        self.block_end()?;
        Some(text)
    }

    /// `<pre class="x">raw</pre>`
    fn pre_tag(&mut self) -> Option<BlockMatch> {
        let start = self.pos;
        if !self.eat("<pre") {
            return None;
        }
        if self.peek() == Some(' ') {
            self.take_while(|c| c != '>' && c != '\n');
        }
        if !self.eat(">") {
            return None;
        }
        let open_tag = self.slice(start, self.pos);
        let text = self.until("</pre>", false)?;
        self.block_end()?;
        Some(BlockMatch::PreTag { open_tag, text })
    }

    // =========================================================================
    // Quotes and footnotes
    // =========================================================================

    /// `bq.:cite content`, or `bq.. ` with paragraphs up to the next signature.
    fn blockquote(&mut self) -> Option<BlockMatch> {
        if !self.eat("bq") {
            return None;
        }
        let attributes = self.block_attributes();
        let (extended, cite) = self.extended_signature_end()?;
        let mut paragraphs = vec![self.paragraph_body()?];
        if extended {
            loop {
                let end = self.pos;
                self.skip_blank_lines();
                if self.is_at_end() || self.probe(Self::signature) {
                    self.pos = end;
                    break;
                }
                paragraphs.push(self.paragraph_body()?);
            }
        }
        Some(BlockMatch::Blockquote {
            attributes,
            cite,
            paragraphs,
        })
    }

    /// `fn1(attrs). content`
    fn footnote(&mut self) -> Option<BlockMatch> {
        if !self.eat("fn") {
            return None;
        }
        let number = self.take_while(|c| c.is_ascii_digit());
        if number.is_empty() {
            return None;
        }
        let attributes = self.block_attributes();
        self.signature_end()?;
        let content = self.block_body()?;
        Some(BlockMatch::Footnote {
            number,
            attributes,
            content,
        })
    }

    // =========================================================================
    // Tables
    // =========================================================================

    fn table(&mut self) -> Option<BlockMatch> {
        let attributes = self
            .attempt(|s| {
                if !s.eat("table") {
                    return None;
                }
                let attributes = s.block_attributes();
                (s.eat(".") && s.eat("\n")).then_some(attributes)
            })
            .unwrap_or_default();
        let mut rows = vec![self.table_row()?];
        while self.peek() == Some('\n') && !self.at_block_end() {
            self.advance();
            rows.push(self.table_row()?);
        }
        self.block_end()?;
        Some(BlockMatch::Table { attributes, rows })
    }

    /// `(attrs). |cell|cell|`
    fn table_row(&mut self) -> Option<TableRowMatch> {
        let attributes = self
            .attempt(|s| {
                let attributes = s.block_attributes();
                (!attributes.is_empty() && s.eat(". ")).then_some(attributes)
            })
            .unwrap_or_default();
        if !self.eat("|") {
            return None;
        }
        let mut cells = Vec::new();
        loop {
            cells.push(self.table_cell()?);
            let mut i = self.pos;
            while matches!(self.char_at(i), Some(' ' | '\t')) {
                i += 1;
            }
            if matches!(self.char_at(i), None | Some('\n')) {
                self.pos = i;
                break;
            }
        }
        Some(TableRowMatch { attributes, cells })
    }

    /// `_(attrs). content|`
    fn table_cell(&mut self) -> Option<TableCellMatch> {
        let (header, attributes) = self
            .attempt(|s| {
                let header = s.eat_if(|c| c == '_').is_some();
                let attributes = s.block_attributes();
                if !header && attributes.is_empty() {
                    return None;
                }
                s.eat(". ").then_some((header, attributes))
            })
            .unwrap_or_default();
        let content = self.within(Boundary::TableCell, Self::block_content);
        if !self.eat("|") {
            return None;
        }
        Some(TableCellMatch {
            header,
            attributes,
            content,
        })
    }

    // =========================================================================
    // Rules, aliases and lists
    // =========================================================================

    /// `---` or `***` alone in a block.
    fn horizontal_rule(&mut self) -> Option<BlockMatch> {
        let marker = self.eat_if(|c| c == '-' || c == '*')?;
        let run = self.take_while(|c| c == marker);
        if run.chars().count() < 2 {
            return None;
        }
        self.block_end()?;
        Some(BlockMatch::HorizontalRule)
    }

    /// Lines of `[name]url`.
    fn link_aliases(&mut self) -> Option<BlockMatch> {
        let mut aliases = vec![self.link_alias()?];
        while self.peek() == Some('\n') && !self.at_block_end() {
            self.advance();
            aliases.push(self.link_alias()?);
        }
        self.block_end()?;
        Some(BlockMatch::LinkAliases(aliases))
    }

    fn link_alias(&mut self) -> Option<(String, String)> {
        if !self.eat("[") {
            return None;
        }
        let name = self.take_while(|c| !matches!(c, '[' | ']' | '\n'));
        if name.trim().is_empty() || !self.eat("]") {
            return None;
        }
        let url = self.take_while(|c| !c.is_whitespace());
        if url.is_empty() {
            return None;
        }
        self.take_while(|c| c == ' ' || c == '\t');
        Some((name, url))
    }

    /// Lines of `- term := definition`.
    fn definition_list(&mut self) -> Option<BlockMatch> {
        let mut definitions = vec![self.definition()?];
        while self.looking_at("\n- ") {
            self.advance();
            definitions.push(self.definition()?);
        }
        self.block_end()?;
        Some(BlockMatch::DefinitionList(definitions))
    }

    fn definition(&mut self) -> Option<DefinitionMatch> {
        if !self.eat("- ") {
            return None;
        }
        let term = self.within(Boundary::DefinitionTerm, Self::block_content);
        if term.is_empty() || !self.eat(" := ") {
            return None;
        }
        let definition = self.within(Boundary::DefinitionBody, Self::block_content);
        if definition.is_empty() {
            return None;
        }
        Some(DefinitionMatch { term, definition })
    }

    /// Lines of `*`/`#` items; nesting is left to the transform.
    fn list(&mut self) -> Option<BlockMatch> {
        let mut items = vec![self.list_item()?];
        while self.peek() == Some('\n') && self.list_marker_at(self.pos + 1) {
            self.advance();
            items.push(self.list_item()?);
        }
        self.block_end()?;
        Some(BlockMatch::List(items))
    }

    fn list_item(&mut self) -> Option<ListItemMatch> {
        let marker = self.take_while(|c| c == '*' || c == '#');
        if marker.is_empty() {
            return None;
        }
        let attributes = self.block_attributes();
        if !self.eat(" ") {
            return None;
        }
        let content = self.within(Boundary::ListItem, Self::block_content);
        if content.is_empty() {
            return None;
        }
        Some(ListItemMatch {
            marker,
            attributes,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::PhraseKind;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Vec<BlockMatch> {
        Scanner::parse(source).unwrap()
    }

    fn text(s: &str) -> InlineMatch {
        InlineMatch::Text(s.to_string())
    }

    fn paragraph(content: Vec<InlineMatch>) -> BlockMatch {
        BlockMatch::Paragraph {
            attributes: vec![],
            content,
            open_quote: false,
        }
    }

    // =========================================================================
    // Document structure
    // =========================================================================

    #[test]
    fn test_empty_document() {
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("\n \n\t\n"), vec![]);
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        assert_eq!(
            parse("one\n\n\n two\n"),
            vec![paragraph(vec![text("one")]), paragraph(vec![text("two")])]
        );
    }

    #[test]
    fn test_bare_paragraph_drops_indentation() {
        assert_eq!(parse("  \thello  "), vec![paragraph(vec![text("hello")])]);
    }

    #[test]
    fn test_blank_line_may_hold_whitespace() {
        assert_eq!(parse("a\n \t\nb").len(), 2);
    }

    #[test]
    fn test_explicit_paragraph_with_attributes() {
        assert_eq!(
            parse("p(intro). Hello"),
            vec![BlockMatch::Paragraph {
                attributes: vec![AttributeFragment::Class("intro".into())],
                content: vec![text("Hello")],
                open_quote: false,
            }]
        );
    }

    #[test]
    fn test_p_word_is_undecorated() {
        assert_eq!(parse("pretty good"), vec![paragraph(vec![text("pretty good")])]);
    }

    #[test]
    fn test_open_quote_flag() {
        match &parse("\"unfinished quote")[0] {
            BlockMatch::Paragraph { open_quote, .. } => assert!(open_quote),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_heading_and_div() {
        assert_eq!(
            parse("h2. Title\n\ndiv. Box"),
            vec![
                BlockMatch::Heading {
                    level: 2,
                    attributes: vec![],
                    content: vec![text("Title")],
                },
                BlockMatch::Div {
                    attributes: vec![],
                    content: vec![text("Box")],
                },
            ]
        );
    }

    #[test]
    fn test_heading_level_seven_is_paragraph() {
        assert_eq!(parse("h7. x"), vec![paragraph(vec![text("h7. x")])]);
    }

    // =========================================================================
    // Literal blocks
    // =========================================================================

    #[test]
    fn test_notextile_blocks() {
        assert_eq!(
            parse("<notextile>\n*raw*\n</notextile>\n\nnotextile. _also_"),
            vec![
                BlockMatch::Notextile("*raw*".into()),
                BlockMatch::Notextile("_also_".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_notextile_is_error() {
        let error = Scanner::parse("<notextile>\nnever closed").unwrap_err();
        assert_eq!(error.offset, 24);
        assert!(error.expected.contains(&"\n</notextile>".to_string()));
    }

    #[test]
    fn test_block_code() {
        assert_eq!(
            parse("bc. a = 'b'"),
            vec![BlockMatch::BlockCode {
                attributes: vec![],
                text: "a = 'b'".into()
            }]
        );
    }

    #[test]
    fn test_extended_block_code_spans_blank_lines() {
        assert_eq!(
            parse("bc.. one\n\ntwo\n\np. after"),
            vec![
                BlockMatch::BlockCode {
                    attributes: vec![],
                    text: "one\n\ntwo".into()
                },
                paragraph(vec![text("after")]),
            ]
        );
    }

    #[test]
    fn test_pre_tag_block() {
        assert_eq!(
            parse("<pre class=\"x\">\n  a\n\n  b\n</pre>"),
            vec![BlockMatch::PreTag {
                open_tag: "<pre class=\"x\">".into(),
                text: "\n  a\n\n  b\n".into()
            }]
        );
    }

    // =========================================================================
    // Quotes and footnotes
    // =========================================================================

    #[test]
    fn test_blockquote_with_cite() {
        assert_eq!(
            parse("bq.:http://example.com Quoted"),
            vec![BlockMatch::Blockquote {
                attributes: vec![],
                cite: Some("http://example.com".into()),
                paragraphs: vec![ParagraphMatch {
                    content: vec![text("Quoted")],
                    open_quote: false,
                }],
            }]
        );
    }

    #[test]
    fn test_extended_blockquote() {
        let blocks = parse("bq.. one\n\ntwo\n\nh1. End");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            BlockMatch::Blockquote { paragraphs, .. } => assert_eq!(
                paragraphs
                    .iter()
                    .map(|paragraph| paragraph.content.clone())
                    .collect::<Vec<_>>(),
                vec![vec![text("one")], vec![text("two")]]
            ),
            other => panic!("expected blockquote, got {other:?}"),
        }
    }

    #[test]
    fn test_extended_blockquote_flags_open_quote() {
        match &parse("bq.. \"one\n\n\"two\"")[0] {
            BlockMatch::Blockquote { paragraphs, .. } => assert_eq!(
                paragraphs
                    .iter()
                    .map(|paragraph| paragraph.open_quote)
                    .collect::<Vec<_>>(),
                vec![true, false]
            ),
            other => panic!("expected blockquote, got {other:?}"),
        }
    }

    #[test]
    fn test_footnote() {
        assert_eq!(
            parse("fn1. Note"),
            vec![BlockMatch::Footnote {
                number: "1".into(),
                attributes: vec![],
                content: vec![text("Note")],
            }]
        );
    }

    // =========================================================================
    // Tables
    // =========================================================================

    #[test]
    fn test_table_rows_and_cells() {
        let blocks = parse("|_. a|_. b|\n|c|*d*|");
        let BlockMatch::Table { attributes, rows } = &blocks[0] else {
            panic!("expected table, got {blocks:?}");
        };
        assert!(attributes.is_empty());
        assert_eq!(rows.len(), 2);
        assert!(rows[0].cells.iter().all(|cell| cell.header));
        assert_eq!(rows[1].cells[0].content, vec![text("c")]);
        assert_eq!(
            rows[1].cells[1].content,
            vec![InlineMatch::Phrase {
                kind: PhraseKind::Strong,
                attributes: vec![],
                content: vec![text("d")],
            }]
        );
    }

    #[test]
    fn test_table_and_row_attributes() {
        let blocks = parse("table(grid).\n(odd). |a|");
        let BlockMatch::Table { attributes, rows } = &blocks[0] else {
            panic!("expected table, got {blocks:?}");
        };
        assert_eq!(attributes, &vec![AttributeFragment::Class("grid".into())]);
        assert_eq!(rows[0].attributes, vec![AttributeFragment::Class("odd".into())]);
    }

    // =========================================================================
    // Lists and friends
    // =========================================================================

    #[test]
    fn test_nested_list_items() {
        assert_eq!(
            parse("* a\n** b\n"),
            vec![BlockMatch::List(vec![
                ListItemMatch {
                    marker: "*".into(),
                    attributes: vec![],
                    content: vec![text("a")],
                },
                ListItemMatch {
                    marker: "**".into(),
                    attributes: vec![],
                    content: vec![text("b")],
                },
            ])]
        );
    }

    #[test]
    fn test_list_item_continuation_line() {
        let blocks = parse("# one\ncontinued\n# two");
        let BlockMatch::List(items) = &blocks[0] else {
            panic!("expected list, got {blocks:?}");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].content,
            vec![text("one"), InlineMatch::LineBreak, text("continued")]
        );
    }

    #[test]
    fn test_strong_paragraph_is_not_list() {
        assert!(matches!(parse("*bold* start")[0], BlockMatch::Paragraph { .. }));
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(
            parse("a\n\n---\n\nb")[1],
            BlockMatch::HorizontalRule
        );
    }

    #[test]
    fn test_link_aliases() {
        assert_eq!(
            parse("[rc]http://textile.example\n[g]http://google.com"),
            vec![BlockMatch::LinkAliases(vec![
                ("rc".into(), "http://textile.example".into()),
                ("g".into(), "http://google.com".into()),
            ])]
        );
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(
            parse("- cat := meows\n- dog := barks"),
            vec![BlockMatch::DefinitionList(vec![
                DefinitionMatch {
                    term: vec![text("cat")],
                    definition: vec![text("meows")],
                },
                DefinitionMatch {
                    term: vec![text("dog")],
                    definition: vec![text("barks")],
                },
            ])]
        );
    }
}
