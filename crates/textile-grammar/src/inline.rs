//! Inline grammar: spans recognized inside block content.
//!
//! Alternatives are tried in a fixed order at every position and the first
//! that matches wins. When none does, one character is taken as literal text
//! and the loop moves on, so content only fails to parse where a construct
//! has no literal fallback (an opened `<notextile>` tag).

use crate::matches::{InlineMatch, PhraseKind};
use crate::scanner::{Rule, Scanner, MAX_NESTING};

/// Typographic substitutions matched verbatim, longest first where they overlap.
const ENTITIES: [&str; 8] = ["...", "--", "(TM)", "(tm)", "(C)", "(c)", "(R)", "(r)"];

/// Punctuation that ends a sentence rather than a url.
const URL_TRAILING: [char; 7] = ['.', ',', ';', ':', '!', '?', '\''];

impl Scanner {
    /// Parse inline content until the current boundary or `closer`.
    /// Nested too deeply, it matches nothing and the enclosing rule fails.
    pub(crate) fn content(&mut self, closer: &dyn Fn(&Scanner) -> bool) -> Vec<InlineMatch> {
        if self.depth >= MAX_NESTING {
            return Vec::new();
        }
        self.depth += 1;
        let mut matches = Vec::new();
        let mut text = String::new();

        while !self.at_boundary() && !closer(self) {
            if let Some(element) = self.inline_element() {
                if !text.is_empty() {
                    matches.push(InlineMatch::Text(std::mem::take(&mut text)));
                }
                matches.push(element);
            } else if let Some(ch) = self.literal() {
                text.push(ch);
            } else {
                break;
            }
        }

        if !text.is_empty() {
            matches.push(InlineMatch::Text(text));
        }
        self.depth -= 1;
        matches
    }

    /// Inline content bounded only by the block.
    pub(crate) fn block_content(&mut self) -> Vec<InlineMatch> {
        self.content(&|_| false)
    }

    fn inline_element(&mut self) -> Option<InlineMatch> {
        self.line_break()
            .or_else(|| self.attempt(Self::notextile_tag))
            .or_else(|| self.attempt(Self::code_tag))
            .or_else(|| self.attempt(Self::html_tag))
            .or_else(|| self.attempt(Self::notextile_phrase))
            .or_else(|| self.attempt(Self::code))
            .or_else(|| self.attempt(Self::footnote_reference))
            .or_else(|| self.attempt(Self::image))
            .or_else(|| self.memoized(Rule::Link, Self::link))
            .or_else(|| self.attempt(Self::dimension))
            .or_else(|| self.attempt(Self::multiplication))
            .or_else(|| self.attempt(Self::caps))
            .or_else(|| self.entity())
            .or_else(|| self.phrase())
            .or_else(|| self.memoized(Rule::Quoted, Self::quoted))
            .or_else(|| self.memoized(Rule::ForcedQuote, Self::forced_quote))
            .or_else(|| self.memoized(Rule::Parenthetical, Self::parenthetical))
    }

    /// One character of plain text. An opening `<notextile>` tag has no
    /// literal reading: it must be closed.
    fn literal(&mut self) -> Option<char> {
        if self.looking_at("<notextile>") {
            return None;
        }
        self.advance()
    }

    fn line_break(&mut self) -> Option<InlineMatch> {
        self.eat_if(|c| c == '\n').map(|_| InlineMatch::LineBreak)
    }

    // =========================================================================
    // Passthrough
    // =========================================================================

    /// `<notextile>raw</notextile>`
    fn notextile_tag(&mut self) -> Option<InlineMatch> {
        if !self.eat("<notextile>") {
            return None;
        }
        self.until("</notextile>", false).map(InlineMatch::Notextile)
    }

    /// `<code lang="rb">raw</code>`
    fn code_tag(&mut self) -> Option<InlineMatch> {
        let start = self.pos;
        if !self.eat("<code") {
            return None;
        }
        if self.peek() == Some(' ') {
            self.take_while(|c| c != '>' && c != '\n');
        }
        if !self.eat(">") {
            return None;
        }
        let open_tag = self.slice(start, self.pos);
        let text = self.until("</code>", true)?;
        Some(InlineMatch::CodeTag { open_tag, text })
    }

    /// `<b>`, `</b>`, `<br />`, `<!-- comment -->`
    fn html_tag(&mut self) -> Option<InlineMatch> {
        let start = self.pos;
        if !self.eat("<") {
            return None;
        }
        if self.looking_at("!--") {
            self.until("-->", true)?;
            return Some(InlineMatch::HtmlTag(self.slice(start, self.pos)));
        }
        self.eat_if(|c| c == '/');
        let first = self.eat_if(|c| c.is_ascii_alphabetic())?;
        let rest = self.take_while(|c| c.is_ascii_alphanumeric());
        if format!("{first}{rest}") == "notextile" {
            return None;
        }
        if !matches!(self.peek(), Some('>' | ' ' | '/')) {
            return None;
        }
        self.take_while(|c| c != '>' && c != '<' && c != '\n');
        if !self.eat(">") {
            return None;
        }
        Some(InlineMatch::HtmlTag(self.slice(start, self.pos)))
    }

    /// `==raw==`
    fn notextile_phrase(&mut self) -> Option<InlineMatch> {
        if !self.eat("==") {
            return None;
        }
        let text = self.until("==", true)?;
        (!text.is_empty()).then_some(InlineMatch::Notextile(text))
    }

    /// `@code@`
    fn code(&mut self) -> Option<InlineMatch> {
        if !self.at_word_start() || !self.eat("@") {
            return None;
        }
        if self.peek().is_none_or(char::is_whitespace) {
            return None;
        }
        let text = self.until("@", true)?;
        Some(InlineMatch::Code(text))
    }

    // =========================================================================
    // References, images and links
    // =========================================================================

    /// `word[12]`
    fn footnote_reference(&mut self) -> Option<InlineMatch> {
        if self.prev().is_none_or(char::is_whitespace) || !self.eat("[") {
            return None;
        }
        let number = self.take_while(|c| c.is_ascii_digit());
        if number.is_empty() || !self.eat("]") {
            return None;
        }
        if self.peek().is_some_and(char::is_alphanumeric) {
            return None;
        }
        Some(InlineMatch::FootnoteReference(number))
    }

    /// `!src!`, `!src(alt)!`, optionally followed by `:url`
    fn image(&mut self) -> Option<InlineMatch> {
        if !self.eat("!") {
            return None;
        }
        let attributes = self.image_attributes();
        let src = self.take_while(|c| !c.is_whitespace() && c != '!' && c != '(');
        if src.is_empty() {
            return None;
        }
        let alt = if self.eat_if(|c| c == '(').is_some() {
            let alt = self.take_while(|c| c != ')' && c != '!' && c != '\n');
            if !self.eat(")") {
                return None;
            }
            Some(alt)
        } else {
            None
        };
        if !self.eat("!") {
            return None;
        }
        let href = self.attempt(|s| {
            s.eat_if(|c| c == ':')?;
            s.url()
        });
        Some(InlineMatch::Image {
            attributes,
            src,
            alt,
            href,
        })
    }

    /// `"(class)label (title)":url`
    fn link(&mut self) -> Option<InlineMatch> {
        if !self.eat("\"") {
            return None;
        }
        let attributes = self.phrase_attributes();
        let content = self.content(&|s: &Scanner| s.looking_at("\":") || s.link_title_ahead());
        if content.is_empty() {
            return None;
        }
        let title = self.attempt(Self::link_title);
        if !self.eat("\":") {
            return None;
        }
        let href = self.url()?;
        Some(InlineMatch::Link {
            attributes,
            content,
            title,
            href,
        })
    }

    /// ` (title)` directly before the `":` of a link.
    fn link_title(&mut self) -> Option<String> {
        self.eat_if(|c| c == ' ');
        if !self.eat("(") {
            return None;
        }
        let title = self.take_while(|c| c != ')' && c != '\n');
        if title.is_empty() || !self.eat(")") || !self.looking_at("\":") {
            return None;
        }
        Some(title)
    }

    fn link_title_ahead(&self) -> bool {
        let mut i = self.pos;
        if self.char_at(i) == Some(' ') {
            i += 1;
        }
        if self.char_at(i) != Some('(') {
            return false;
        }
        i += 1;
        let title_start = i;
        while let Some(ch) = self.char_at(i) {
            match ch {
                ')' => return i > title_start && self.looking_at_from(i + 1, "\":"),
                '\n' => return false,
                _ => i += 1,
            }
        }
        false
    }

    /// A run of non-space characters, minus trailing sentence punctuation.
    pub(crate) fn url(&mut self) -> Option<String> {
        let start = self.pos;
        let mut end = start;
        while self
            .char_at(end)
            .is_some_and(|c| !c.is_whitespace() && !matches!(c, '<' | '>' | '"'))
        {
            end += 1;
        }
        loop {
            match self.char_at(end.wrapping_sub(1)) {
                Some(c) if end > start && URL_TRAILING.contains(&c) => end -= 1,
                Some(')') if end > start && !self.chars[start..end].contains(&'(') => end -= 1,
                _ => break,
            }
        }
        if end == start {
            self.fail("url");
            return None;
        }
        self.pos = end;
        Some(self.slice(start, end))
    }

    // =========================================================================
    // Typography
    // =========================================================================

    /// A number in a `3' x 4'` chain: either before a multiplication sign or
    /// right after one.
    fn dimension(&mut self) -> Option<InlineMatch> {
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        let start = self.pos;
        let follows_sign = self.multiplication_before(start);
        if !self.at_word_start() && !follows_sign {
            return None;
        }
        self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.char_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }
        self.eat_if(|c| c == '\'' || c == '"');
        if !follows_sign && !self.multiplication_after(self.pos) {
            return None;
        }
        Some(InlineMatch::Dimension(self.slice(start, self.pos)))
    }

    /// The `x` between two dimensions.
    fn multiplication(&mut self) -> Option<InlineMatch> {
        if self.peek() != Some('x') || !self.dimension_ends_before(self.pos) {
            return None;
        }
        let mut after = self.pos + 1;
        if self.char_at(after) == Some(' ') {
            after += 1;
        }
        if !self.char_at(after).is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        self.advance();
        Some(InlineMatch::Entity("x".to_string()))
    }

    /// ` x 4` or `x4` starts at `index`.
    fn multiplication_after(&self, index: usize) -> bool {
        let mut i = index;
        if self.char_at(i) == Some(' ') {
            i += 1;
        }
        if self.char_at(i) != Some('x') {
            return false;
        }
        i += 1;
        if self.char_at(i) == Some(' ') {
            i += 1;
        }
        self.char_at(i).is_some_and(|c| c.is_ascii_digit())
    }

    /// `3' x ` or `3x` ends just before `index`.
    fn multiplication_before(&self, index: usize) -> bool {
        let mut i = index;
        if i > 0 && self.char_at(i - 1) == Some(' ') {
            i -= 1;
        }
        if i == 0 || self.char_at(i - 1) != Some('x') {
            return false;
        }
        self.dimension_ends_before(i - 1)
    }

    /// `3'` or `3 ` ends just before `index`.
    fn dimension_ends_before(&self, index: usize) -> bool {
        let mut i = index;
        if i > 0 && self.char_at(i - 1) == Some(' ') {
            i -= 1;
        }
        if i > 0 && matches!(self.char_at(i - 1), Some('\'' | '"')) {
            i -= 1;
        }
        i > 0 && self.char_at(i - 1).is_some_and(|c| c.is_ascii_digit())
    }

    /// `NASA` or `NASA(National Aeronautics and Space Administration)`
    fn caps(&mut self) -> Option<InlineMatch> {
        if !self.at_word_start() {
            return None;
        }
        let start = self.pos;
        for _ in 0..2 {
            self.eat_if(|c| c.is_ascii_uppercase())?;
        }
        self.take_while(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if self.peek().is_some_and(char::is_alphanumeric) {
            return None;
        }
        let caps = self.slice(start, self.pos);
        let expansion = self.attempt(|s| {
            s.eat_if(|c| c == '(')?;
            let expansion = s.take_while(|c| c != ')' && c != '\n');
            (!expansion.trim().is_empty() && s.eat(")")).then_some(expansion)
        });
        Some(match expansion {
            Some(expansion) => InlineMatch::Acronym { caps, expansion },
            None => InlineMatch::Caps(caps),
        })
    }

    /// `...`, `--`, ` - `, `(TM)`, `(C)`, `(R)`
    fn entity(&mut self) -> Option<InlineMatch> {
        if self.looking_at(" - ") {
            self.pos += 2;
            return Some(InlineMatch::Entity(" -".to_string()));
        }
        let literal = ENTITIES.iter().find(|literal| self.looking_at(literal))?;
        self.pos += literal.chars().count();
        Some(InlineMatch::Entity(literal.to_string()))
    }

    // =========================================================================
    // Phrases and quotes
    // =========================================================================

    fn phrase(&mut self) -> Option<InlineMatch> {
        if !self.at_word_start() {
            return None;
        }
        PhraseKind::ORDERED.iter().find_map(|&(delimiter, kind)| {
            self.memoized(Rule::Phrase(kind), |s| s.phrase_of(delimiter, kind))
        })
    }

    fn phrase_of(&mut self, delimiter: &'static str, kind: PhraseKind) -> Option<InlineMatch> {
        if !self.eat(delimiter) || self.peek().is_none_or(char::is_whitespace) {
            return None;
        }
        let attributes = self.phrase_attributes();
        let content = self.content(&|s: &Scanner| s.at_closer(delimiter));
        if content.is_empty() || !self.at_closer(delimiter) {
            self.fail(delimiter);
            return None;
        }
        self.pos += delimiter.chars().count();
        Some(InlineMatch::Phrase {
            kind,
            attributes,
            content,
        })
    }

    /// `delimiter` after a non-space and before a non-word character.
    pub(crate) fn at_closer(&self, delimiter: &str) -> bool {
        self.looking_at(delimiter)
            && self.prev().is_some_and(|c| !c.is_whitespace())
            && self
                .char_at(self.pos + delimiter.chars().count())
                .is_none_or(|c| !c.is_alphanumeric())
    }

    /// `"quoted phrase"`
    fn quoted(&mut self) -> Option<InlineMatch> {
        if !self.at_word_start() || !self.eat("\"") || self.peek().is_none_or(char::is_whitespace) {
            return None;
        }
        let content = self.content(&|s: &Scanner| s.at_closer("\""));
        if content.is_empty() || !self.at_closer("\"") {
            self.fail("\"");
            return None;
        }
        self.advance();
        Some(InlineMatch::Quoted(content))
    }

    /// `[forced]`
    fn forced_quote(&mut self) -> Option<InlineMatch> {
        self.bracketed("[", "]").map(InlineMatch::ForcedQuote)
    }

    /// `(aside)`
    fn parenthetical(&mut self) -> Option<InlineMatch> {
        self.bracketed("(", ")").map(InlineMatch::Parenthetical)
    }

    fn bracketed(&mut self, open: &'static str, close: &'static str) -> Option<Vec<InlineMatch>> {
        if !self.eat(open) {
            return None;
        }
        let content = self.content(&|s: &Scanner| s.looking_at(close));
        if content.is_empty() || !self.eat(close) {
            return None;
        }
        Some(content)
    }
}
