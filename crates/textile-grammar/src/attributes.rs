//! Attribute grammar: class, id, style and language declarations.
//!
//! ```text
//! p(intro#lead){color:red}[en]<. text
//! *(hot)phrase*
//! !>(photo)img.png!
//! ```

use crate::matches::AttributeFragment;
use crate::scanner::Scanner;

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl Scanner {
    /// Declarations after a block signature, list marker, row or cell.
    pub(crate) fn block_attributes(&mut self) -> Vec<AttributeFragment> {
        let mut fragments = Vec::new();
        let mut padding_left = 0;
        let mut padding_right = 0;

        loop {
            if let Some(fragment) = self
                .bracketed_attribute()
                .or_else(|| self.alignment())
                .or_else(|| self.dotted_class())
                .or_else(|| self.hash_id())
            {
                fragments.push(fragment);
            } else if self.eat_if(|c| c == '(').is_some() {
                padding_left += 1;
            } else if self.eat_if(|c| c == ')').is_some() {
                padding_right += 1;
            } else {
                break;
            }
        }

        let mut padding = Vec::new();
        if padding_left > 0 {
            padding.push(("padding-left".to_string(), padding_left.to_string()));
        }
        if padding_right > 0 {
            padding.push(("padding-right".to_string(), padding_right.to_string()));
        }
        if !padding.is_empty() {
            fragments.push(AttributeFragment::Style(padding));
        }
        fragments
    }

    /// Declarations at the start of a phrase or link label.
    pub(crate) fn phrase_attributes(&mut self) -> Vec<AttributeFragment> {
        let mut fragments = Vec::new();
        while let Some(fragment) = self.bracketed_attribute() {
            fragments.push(fragment);
        }
        fragments
    }

    /// Declarations after the `!` of an image; alignment floats the image.
    pub(crate) fn image_attributes(&mut self) -> Vec<AttributeFragment> {
        let mut fragments = Vec::new();
        while let Some(fragment) = self.bracketed_attribute().or_else(|| self.alignment()) {
            fragments.push(fragment);
        }
        fragments
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn bracketed_attribute(&mut self) -> Option<AttributeFragment> {
        self.attempt(Self::class_and_id)
            .or_else(|| self.attempt(Self::style))
            .or_else(|| self.attempt(Self::language))
    }

    /// `(a b)`, `(#id)` or `(a b#id)`
    fn class_and_id(&mut self) -> Option<AttributeFragment> {
        if !self.eat("(") {
            return None;
        }
        let class = self.class_list();
        let id = if self.eat_if(|c| c == '#').is_some() {
            let id = self.take_while(is_name_char);
            if id.is_empty() {
                return None;
            }
            Some(id)
        } else {
            None
        };
        if !self.eat(")") {
            return None;
        }
        match (class.is_empty(), id) {
            (false, Some(id)) => Some(AttributeFragment::ClassAndId { class, id }),
            (true, Some(id)) => Some(AttributeFragment::Id(id)),
            (false, None) => Some(AttributeFragment::Class(class)),
            (true, None) => None,
        }
    }

    /// Space separated class names.
    fn class_list(&mut self) -> String {
        let mut names = vec![self.take_while(is_name_char)];
        if names[0].is_empty() {
            return String::new();
        }
        while self.peek() == Some(' ') && self.char_at(self.pos + 1).is_some_and(is_name_char) {
            self.advance();
            names.push(self.take_while(is_name_char));
        }
        names.join(" ")
    }

    /// `{color: red; margin-top: 1em}`
    fn style(&mut self) -> Option<AttributeFragment> {
        if !self.eat("{") {
            return None;
        }
        let text = self.take_while(|c| c != '}' && c != '\n');
        if !self.eat("}") {
            return None;
        }
        let declarations: Vec<(String, String)> = text
            .split(';')
            .filter_map(|declaration| {
                let (name, value) = declaration.split_once(':')?;
                let (name, value) = (name.trim(), value.trim());
                (!name.is_empty() && !value.is_empty())
                    .then(|| (name.to_string(), value.to_string()))
            })
            .collect();
        if declarations.is_empty() {
            return None;
        }
        Some(AttributeFragment::Style(declarations))
    }

    /// `[fr]`
    fn language(&mut self) -> Option<AttributeFragment> {
        if !self.eat("[") {
            return None;
        }
        let lang = self.take_while(|c| c.is_ascii_alphabetic() || c == '-');
        if lang.is_empty() || !self.eat("]") {
            return None;
        }
        Some(AttributeFragment::Language(lang))
    }

    /// `<>`, `<`, `>` or `=`
    fn alignment(&mut self) -> Option<AttributeFragment> {
        let align = if self.looking_at("<>") {
            self.pos += 2;
            "justify"
        } else {
            match self.eat_if(|c| matches!(c, '<' | '>' | '='))? {
                '<' => "left",
                '>' => "right",
                _ => "center",
            }
        };
        Some(AttributeFragment::Style(vec![(
            "align".to_string(),
            align.to_string(),
        )]))
    }

    /// `.name`
    fn dotted_class(&mut self) -> Option<AttributeFragment> {
        if self.peek() != Some('.') || !self.char_at(self.pos + 1).is_some_and(char::is_alphabetic) {
            return None;
        }
        self.advance();
        Some(AttributeFragment::Class(self.take_while(is_name_char)))
    }

    /// `#name`
    fn hash_id(&mut self) -> Option<AttributeFragment> {
        if self.peek() != Some('#') || !self.char_at(self.pos + 1).is_some_and(char::is_alphabetic) {
            return None;
        }
        self.advance();
        Some(AttributeFragment::Id(self.take_while(is_name_char)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(source: &str) -> (Vec<AttributeFragment>, String) {
        let mut scanner = Scanner::new(source);
        let fragments = scanner.block_attributes();
        let rest = scanner.slice(scanner.pos, scanner.chars.len());
        (fragments, rest)
    }

    fn style(pairs: &[(&str, &str)]) -> AttributeFragment {
        AttributeFragment::Style(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    // =========================================================================
    // Bracketed forms
    // =========================================================================

    #[test]
    fn test_no_attributes() {
        assert_eq!(block(". text"), (vec![], ". text".to_string()));
    }

    #[test]
    fn test_class_list() {
        let (fragments, rest) = block("(big red). x");
        assert_eq!(fragments, vec![AttributeFragment::Class("big red".into())]);
        assert_eq!(rest, ". x");
    }

    #[test]
    fn test_id_only() {
        let (fragments, _) = block("(#main). x");
        assert_eq!(fragments, vec![AttributeFragment::Id("main".into())]);
    }

    #[test]
    fn test_class_and_id() {
        let (fragments, _) = block("(big#main). x");
        assert_eq!(
            fragments,
            vec![AttributeFragment::ClassAndId {
                class: "big".into(),
                id: "main".into()
            }]
        );
    }

    #[test]
    fn test_style_declarations() {
        let (fragments, _) = block("{color: red; margin:0;}. x");
        assert_eq!(fragments, vec![style(&[("color", "red"), ("margin", "0")])]);
    }

    #[test]
    fn test_language() {
        let (fragments, _) = block("[fr]. x");
        assert_eq!(fragments, vec![AttributeFragment::Language("fr".into())]);
    }

    #[test]
    fn test_declarations_keep_order() {
        let (fragments, _) = block("{color:red}(big)[en]. x");
        assert_eq!(
            fragments,
            vec![
                style(&[("color", "red")]),
                AttributeFragment::Class("big".into()),
                AttributeFragment::Language("en".into()),
            ]
        );
    }

    // =========================================================================
    // Shorthands
    // =========================================================================

    #[test]
    fn test_dotted_classes_and_hash_id() {
        let (fragments, rest) = block(".intro.lead#top. x");
        assert_eq!(
            fragments,
            vec![
                AttributeFragment::Class("intro".into()),
                AttributeFragment::Class("lead".into()),
                AttributeFragment::Id("top".into()),
            ]
        );
        assert_eq!(rest, ". x");
    }

    #[test]
    fn test_alignment() {
        assert_eq!(block("<>. x").0, vec![style(&[("align", "justify")])]);
        assert_eq!(block("=. x").0, vec![style(&[("align", "center")])]);
        assert_eq!(block(">. x").0, vec![style(&[("align", "right")])]);
    }

    #[test]
    fn test_padding_runs_are_counted() {
        let (fragments, rest) = block("((). x");
        assert_eq!(
            fragments,
            vec![style(&[("padding-left", "2"), ("padding-right", "1")])]
        );
        assert_eq!(rest, ". x");
    }

    #[test]
    fn test_phrase_attributes_ignore_shorthands() {
        let mut scanner = Scanner::new(".NET");
        assert!(scanner.phrase_attributes().is_empty());
        assert_eq!(scanner.pos, 0);
    }

    #[test]
    fn test_empty_parentheses_are_not_attributes() {
        let mut scanner = Scanner::new("()x");
        assert!(scanner.phrase_attributes().is_empty());
        assert_eq!(scanner.pos, 0);
    }
}
