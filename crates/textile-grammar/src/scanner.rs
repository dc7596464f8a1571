use std::collections::{BTreeSet, HashMap};

use crate::matches::{BlockMatch, InlineMatch, PhraseKind};
use crate::SyntaxError;

/// Which structural edge ends the content currently being scanned.
///
/// Set by the block rules before they hand control to the inline grammar;
/// nested inline rules inherit it, so a phrase can never run past a table
/// cell or onto the next list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Boundary {
    /// Only the end of the block.
    Block,
    /// `\n` followed by another list marker.
    ListItem,
    /// `|` or a newline.
    TableCell,
    /// ` := ` or a newline.
    DefinitionTerm,
    /// `\n- ` starting the next entry.
    DefinitionBody,
}

/// Deepest inline nesting; past it, openers read as literal text.
pub(crate) const MAX_NESTING: usize = 64;

/// Inline rules whose outcome at a position is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Rule {
    Phrase(PhraseKind),
    Link,
    Quoted,
    ForcedQuote,
    Parenthetical,
}

/// Textile source scanner.
///
/// A PEG-style recursive descent engine over a `Vec<char>`:
/// - ordered choice through [`Scanner::attempt`], which rewinds on failure
/// - the furthest failure position and the literals expected there are
///   tracked for error reporting
/// - outcomes of the recursive inline rules are memoized per position
pub struct Scanner {
    pub(crate) chars: Vec<char>,
    pub(crate) pos: usize,
    pub(crate) boundary: Boundary,
    /// Inline content levels currently open.
    pub(crate) depth: usize,
    /// Start of the whitespace that runs to the end of input.
    trailing: usize,
    furthest: usize,
    expected: BTreeSet<&'static str>,
    quiet: bool,
    memo: HashMap<(usize, Rule, Boundary), Option<(InlineMatch, usize)>>,
}

impl Scanner {
    /// Create a scanner over the given source. `\r\n` is folded to `\n`.
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.replace("\r\n", "\n").chars().collect();
        let trailing = chars
            .iter()
            .rposition(|c| !matches!(c, ' ' | '\t' | '\n'))
            .map_or(0, |i| i + 1);
        Self {
            chars,
            pos: 0,
            boundary: Boundary::Block,
            depth: 0,
            trailing,
            furthest: 0,
            expected: BTreeSet::new(),
            quiet: false,
            memo: HashMap::new(),
        }
    }

    /// Parse a whole document into its block matches.
    pub fn parse(source: &str) -> Result<Vec<BlockMatch>, SyntaxError> {
        let mut scanner = Scanner::new(source);
        let blocks = scanner.document();
        match &blocks {
            Ok(blocks) => tracing::debug!(blocks = blocks.len(), "parsed textile document"),
            Err(error) => tracing::debug!(%error, "textile document failed to parse"),
        }
        blocks
    }

    // =========================================================================
    // Ordered choice
    // =========================================================================

    /// Run `rule`; on `None` rewind to where it started.
    pub(crate) fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let pos = self.pos;
        let boundary = self.boundary;
        let result = rule(self);
        if result.is_none() {
            self.pos = pos;
            self.boundary = boundary;
        }
        result
    }

    /// Like [`Scanner::attempt`], but the outcome is remembered so the rule
    /// runs at most once per position and boundary.
    pub(crate) fn memoized(
        &mut self,
        rule_id: Rule,
        rule: impl FnOnce(&mut Self) -> Option<InlineMatch>,
    ) -> Option<InlineMatch> {
        let key = (self.pos, rule_id, self.boundary);
        if let Some(outcome) = self.memo.get(&key) {
            let (matched, end) = outcome.clone()?;
            self.pos = end;
            return Some(matched);
        }
        let result = self.attempt(rule);
        let outcome = result.clone().map(|matched| (matched, self.pos));
        self.memo.insert(key, outcome);
        result
    }

    /// Check whether `rule` would match here, without consuming input or
    /// recording expectations.
    pub(crate) fn probe<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> bool {
        let pos = self.pos;
        let boundary = self.boundary;
        let quiet = std::mem::replace(&mut self.quiet, true);
        let matched = rule(self).is_some();
        self.quiet = quiet;
        self.pos = pos;
        self.boundary = boundary;
        matched
    }

    /// Run `rule` with a different content boundary, restoring the old one.
    pub(crate) fn within<T>(&mut self, boundary: Boundary, rule: impl FnOnce(&mut Self) -> T) -> T {
        let outer = std::mem::replace(&mut self.boundary, boundary);
        let result = rule(self);
        self.boundary = outer;
        result
    }

    // =========================================================================
    // Character navigation
    // =========================================================================

    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(crate) fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// The character just before the cursor.
    pub(crate) fn prev(&self) -> Option<char> {
        self.pos.checked_sub(1).and_then(|i| self.char_at(i))
    }

    pub(crate) fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub(crate) fn looking_at(&self, literal: &str) -> bool {
        self.looking_at_from(self.pos, literal)
    }

    pub(crate) fn looking_at_from(&self, index: usize, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, ch)| self.char_at(index + i) == Some(ch))
    }

    /// Consume `literal` or record it as expected here.
    pub(crate) fn eat(&mut self, literal: &'static str) -> bool {
        if self.looking_at(literal) {
            self.pos += literal.chars().count();
            true
        } else {
            self.fail(literal);
            false
        }
    }

    /// Consume one character matching `pred`.
    pub(crate) fn eat_if(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(ch) if pred(ch) => {
                self.pos += 1;
                Some(ch)
            }
            _ => None,
        }
    }

    pub(crate) fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    /// Consume raw text up to `terminator` and the terminator itself.
    /// Fails at end of input, or at a block end when `in_block` is set.
    pub(crate) fn until(&mut self, terminator: &'static str, in_block: bool) -> Option<String> {
        let start = self.pos;
        while !self.looking_at(terminator) {
            if self.is_at_end() || (in_block && self.at_block_end()) {
                self.fail(terminator);
                return None;
            }
            self.pos += 1;
        }
        let text = self.slice(start, self.pos);
        self.pos += terminator.chars().count();
        Some(text)
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Previous character is absent or not part of a word.
    pub(crate) fn at_word_start(&self) -> bool {
        self.prev().is_none_or(|c| !c.is_alphanumeric())
    }

    // =========================================================================
    // Block edges
    // =========================================================================

    /// End of input, a blank line, or nothing but whitespace left.
    pub(crate) fn at_block_end(&self) -> bool {
        if self.pos >= self.trailing {
            return true;
        }
        if self.peek() != Some('\n') {
            return false;
        }
        let mut i = self.pos + 1;
        while matches!(self.char_at(i), Some(' ' | '\t')) {
            i += 1;
        }
        self.char_at(i) == Some('\n')
    }

    /// Consume the end of a block: trailing whitespace to end of input, or
    /// one blank line.
    pub(crate) fn block_end(&mut self) -> Option<()> {
        let start = self.pos;
        while self.eat_if(|c| c == ' ' || c == '\t' || c == '\n').is_some() {}
        if self.is_at_end() {
            return Some(());
        }
        self.pos = start;
        if self.eat_if(|c| c == '\n').is_some() {
            while self.eat_if(|c| c == ' ' || c == '\t').is_some() {}
            if self.eat_if(|c| c == '\n').is_some() {
                return Some(());
            }
        }
        self.pos = start;
        self.fail("blank line");
        None
    }

    /// Consume any run of whitespace-only lines between blocks.
    pub(crate) fn skip_blank_lines(&mut self) {
        loop {
            let start = self.pos;
            while self.eat_if(|c| c == ' ' || c == '\t').is_some() {}
            if self.is_at_end() {
                return;
            }
            if self.eat_if(|c| c == '\n').is_none() {
                self.pos = start;
                return;
            }
        }
    }

    /// The current boundary (or the block's end) has been reached.
    pub(crate) fn at_boundary(&self) -> bool {
        if self.at_block_end() {
            return true;
        }
        match self.boundary {
            Boundary::Block => false,
            Boundary::ListItem => self.peek() == Some('\n') && self.list_marker_at(self.pos + 1),
            Boundary::TableCell => matches!(self.peek(), Some('|' | '\n')),
            Boundary::DefinitionTerm => self.looking_at(" := ") || self.peek() == Some('\n'),
            Boundary::DefinitionBody => self.looking_at("\n- "),
        }
    }

    /// A `*`/`#` run starting a list item at `index`.
    pub(crate) fn list_marker_at(&self, index: usize) -> bool {
        let mut i = index;
        while matches!(self.char_at(i), Some('*' | '#')) {
            i += 1;
        }
        i > index && matches!(self.char_at(i), Some(' ' | '(' | '{' | '[' | '<' | '>' | '='))
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Record that `expected` was tried and failed at the cursor.
    pub(crate) fn fail(&mut self, expected: &'static str) {
        if self.quiet {
            return;
        }
        if self.pos > self.furthest {
            self.furthest = self.pos;
            self.expected.clear();
        }
        if self.pos == self.furthest {
            self.expected.insert(expected);
        }
    }

    pub(crate) fn error(&self) -> SyntaxError {
        let offset = self.furthest.min(self.chars.len());
        let before = &self.chars[..offset];
        let line = before.iter().filter(|&&c| c == '\n').count() + 1;
        let column = offset - before.iter().rposition(|&c| c == '\n').map_or(0, |i| i + 1) + 1;
        let found = match self.char_at(offset) {
            Some(ch) => format!("unexpected {ch:?}"),
            None => "unexpected end of input".to_string(),
        };
        let expected: Vec<String> = self.expected.iter().map(|e| format!("{e:?}")).collect();
        let message = if expected.is_empty() {
            found
        } else {
            format!("{found}, expected one of {}", expected.join(", "))
        };
        SyntaxError {
            message,
            offset,
            line,
            column,
            expected: self.expected.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn test_windows_line_endings_folded() {
        let scanner = Scanner::new("a\r\nb");
        assert_eq!(scanner.chars, vec!['a', '\n', 'b']);
    }

    #[test]
    fn test_attempt_rewinds_on_failure() {
        let mut scanner = Scanner::new("abc");
        let result = scanner.attempt(|s| {
            s.advance();
            s.advance();
            None::<()>
        });
        assert!(result.is_none());
        assert_eq!(scanner.pos, 0);
    }

    #[test]
    fn test_probe_never_consumes() {
        let mut scanner = Scanner::new("abc");
        assert!(scanner.probe(|s| s.eat("ab").then_some(())));
        assert_eq!(scanner.pos, 0);
    }

    #[test]
    fn test_until_stops_at_block_end() {
        let mut scanner = Scanner::new("abc\n\n@");
        assert_eq!(scanner.until("@", true), None);
        let mut scanner = Scanner::new("abc\n\n@");
        assert_eq!(scanner.until("@", false), Some("abc\n\n".to_string()));
    }

    // =========================================================================
    // Block edges
    // =========================================================================

    #[test]
    fn test_block_end_at_eof() {
        let mut scanner = Scanner::new("  \n ");
        assert!(scanner.block_end().is_some());
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_block_end_blank_line() {
        let mut scanner = Scanner::new("\n \t\nnext");
        assert!(scanner.block_end().is_some());
        assert_eq!(scanner.peek(), Some('n'));
    }

    #[test]
    fn test_single_newline_is_not_block_end() {
        let mut scanner = Scanner::new("\nnext");
        assert!(!scanner.at_block_end());
        assert!(scanner.block_end().is_none());
        assert_eq!(scanner.pos, 0);
    }

    #[test]
    fn test_whitespace_run_inside_line() {
        let mut scanner = Scanner::new(&format!("a{}b", " ".repeat(20_000)));
        scanner.pos = 1;
        assert!(!scanner.at_block_end());
        scanner.pos = 10_000;
        assert!(!scanner.at_block_end());

        let mut scanner = Scanner::new("a  \n \t");
        scanner.pos = 1;
        assert!(scanner.at_block_end());
    }

    #[test]
    fn test_newline_then_blank_line_ends_block() {
        let mut scanner = Scanner::new("a\n  \nb");
        scanner.pos = 1;
        assert!(scanner.at_block_end());
        let mut scanner = Scanner::new("a  \n\nb");
        scanner.pos = 1;
        assert!(!scanner.at_block_end());
        scanner.pos = 3;
        assert!(scanner.at_block_end());
    }

    #[test]
    fn test_list_marker_lookahead() {
        let scanner = Scanner::new("** b");
        assert!(scanner.list_marker_at(0));
        let scanner = Scanner::new("*b*");
        assert!(!scanner.list_marker_at(0));
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_error_reports_furthest_position() {
        let mut scanner = Scanner::new("ab\ncd");
        scanner.pos = 4;
        scanner.fail("x");
        scanner.pos = 1;
        scanner.fail("y");
        let error = scanner.error();
        assert_eq!(error.offset, 4);
        assert_eq!(error.line, 2);
        assert_eq!(error.column, 2);
        assert_eq!(error.expected, vec!["x".to_string()]);
    }
}
