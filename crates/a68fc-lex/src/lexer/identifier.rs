//! Bold-tag and identifier lexing, branching on the active stropping mode.
//!
//! `UPPER` stropping: a run of uppercase letters/`_` is a bold tag (keyword, mode
//! indicant, or operator spelling, disambiguated later by the definition extractor); a
//! run of lowercase letters/digits is an identifier.
//!
//! `QUOTE` stropping: a bold tag is written `'upper'…'upper'`, quotes and all; a run of
//! (typically uppercase) letters/digits outside quotes is an identifier.

use crate::keyword::keyword_attribute;
use crate::token::{Attribute, Token};
use crate::unicode::{is_ascii_ident_continue, is_ascii_ident_start};
use crate::Lexer;
use a68fc_util::options::StroppingMode;
use a68fc_util::Symbol;

impl<'a> Lexer<'a> {
    /// Dispatches to the bold-tag or identifier reader for the active stropping mode.
    pub fn lex_identifier_or_bold_tag(&mut self) -> Token {
        match self.options.stropping {
            StroppingMode::Upper => self.lex_upper_stropped(),
            StroppingMode::Quote => self.lex_quote_stropped(),
        }
    }

    fn lex_upper_stropped(&mut self) -> Token {
        let start = self.cursor.snapshot();
        let c = self.cursor.current_char();
        if c.is_ascii_uppercase() || c == '_' {
            while {
                let c = self.cursor.current_char();
                c.is_ascii_uppercase() || c == '_'
            } {
                self.cursor.advance();
            }
            let text = self.cursor.slice_from(start.position).to_string();
            self.bold_tag_token(&text, start)
        } else {
            while is_ascii_ident_continue(self.cursor.current_char())
                && !self.cursor.current_char().is_ascii_uppercase()
            {
                self.cursor.advance();
            }
            let text = self.cursor.slice_from(start.position);
            Token::text(Attribute::Identifier, Symbol::intern(text), self.span_from(start))
        }
    }

    fn lex_quote_stropped(&mut self) -> Token {
        let start = self.cursor.snapshot();
        if self.cursor.current_char() == '\'' {
            self.cursor.advance();
            let word_start = self.cursor.position();
            while self.cursor.current_char() != '\'' && !self.cursor.is_at_end() {
                self.cursor.advance();
            }
            let text = self.cursor.slice_from(word_start).to_ascii_uppercase();
            if self.cursor.current_char() == '\'' {
                self.cursor.advance();
            } else {
                self.handler.error(
                    "unterminated quote-stropped bold tag".to_string(),
                    self.span_from(start),
                );
            }
            self.bold_tag_token(&text, start)
        } else {
            while is_ascii_ident_continue(self.cursor.current_char()) {
                self.cursor.advance();
            }
            let text = self.cursor.slice_from(start.position);
            Token::text(Attribute::Identifier, Symbol::intern(text), self.span_from(start))
        }
    }

    /// Classifies a normalized bold-tag spelling: a reserved structural word becomes
    /// its specific attribute (merging `GO TO` into `GOTO` when the next bold tag is
    /// `TO`); anything else is a plain `BoldTag` pending elaboration by the definition
    /// extractor.
    fn bold_tag_token(&mut self, text: &str, start: crate::cursor::CursorSnapshot) -> Token {
        if text == "GO" {
            let mark = self.cursor.snapshot();
            self.skip_whitespace_and_comments();
            if self.peek_bold_word().as_deref() == Some("TO") {
                self.consume_bold_word("TO");
                return Token::punct(Attribute::GotoSymbol, self.span_from(start));
            }
            self.cursor.restore(mark);
        }
        match keyword_attribute(text) {
            Some(attr) => Token::punct(attr, self.span_from(start)),
            None => Token::text(Attribute::BoldTag, Symbol::intern(text), self.span_from(start)),
        }
    }

    /// True if the cursor is sitting at the start of a bold tag or identifier.
    pub fn at_tag_start(&self) -> bool {
        let c = self.cursor.current_char();
        c == '\'' || is_ascii_ident_start(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::diagnostic::Handler;
    use a68fc_util::CompileOptions;

    fn lex_upper(source: &str) -> Token {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = crate::Lexer::new(source, &options, &handler);
        lexer.next_token(false)
    }

    fn lex_quote(source: &str) -> Token {
        let handler = Handler::new();
        let options = CompileOptions::with_stropping(a68fc_util::options::StroppingMode::Quote);
        let mut lexer = crate::Lexer::new(source, &options, &handler);
        lexer.next_token(false)
    }

    #[test]
    fn upper_stropping_keyword() {
        let tok = lex_upper("BEGIN");
        assert_eq!(tok.attribute, Attribute::BeginSymbol);
    }

    #[test]
    fn upper_stropping_identifier() {
        let tok = lex_upper("plusab");
        assert_eq!(tok.attribute, Attribute::Identifier);
        assert_eq!(tok.symbol.unwrap().as_str(), "plusab");
    }

    #[test]
    fn upper_stropping_plain_bold_tag() {
        let tok = lex_upper("INT");
        assert_eq!(tok.attribute, Attribute::BoldTag);
        assert_eq!(tok.symbol.unwrap().as_str(), "INT");
    }

    #[test]
    fn quote_stropped_keyword() {
        let tok = lex_quote("'BEGIN'");
        assert_eq!(tok.attribute, Attribute::BeginSymbol);
    }

    #[test]
    fn quote_stropped_identifier() {
        let tok = lex_quote("PLUSAB");
        assert_eq!(tok.attribute, Attribute::Identifier);
    }

    #[test]
    fn go_to_merges_into_goto() {
        let tok = lex_upper("GO TO");
        assert_eq!(tok.attribute, Attribute::GotoSymbol);
    }
}
