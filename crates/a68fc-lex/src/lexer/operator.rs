//! Operator-spelling and punctuation lexing.
//!
//! Operator tokens are runs over the MONAD character set; the scanner cannot tell a
//! trailing `=` apart from an intended `ALT_EQUALS` marker (used by `PRIO x = …` and
//! `OP x = …` definitions), so it always swallows the whole run and leaves the split to
//! the definition extractor, per the data-model note on priority/op handling.

use crate::token::{Attribute, Token};
use crate::Lexer;
use a68fc_util::Symbol;

/// Characters that may appear in an operator spelling.
pub const MONAD_CHARS: &str = "+-*/=<>&^~?\\@%";

pub fn is_monad_char(c: char) -> bool {
    MONAD_CHARS.contains(c)
}

impl<'a> Lexer<'a> {
    /// Lexes a maximal run of `MONAD_CHARS` into an `Operator` token.
    pub fn lex_operator(&mut self) -> Token {
        let start = self.cursor.snapshot();
        while is_monad_char(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start.position);
        let span = self.span_from(start);
        Token::text(Attribute::Operator, Symbol::intern(text), span)
    }

    /// Lexes a single-character punctuation token.
    pub fn lex_punct(&mut self, attribute: Attribute) -> Token {
        let start = self.cursor.snapshot();
        self.cursor.advance();
        Token::punct(attribute, self.span_from(start))
    }

    /// Lexes `:` or `:=`.
    pub fn lex_colon(&mut self) -> Token {
        let start = self.cursor.snapshot();
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::punct(Attribute::BecomesSymbol, self.span_from(start))
        } else {
            Token::punct(Attribute::Colon, self.span_from(start))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::diagnostic::Handler;
    use a68fc_util::CompileOptions;

    fn lex_one(source: &str) -> Token {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = crate::Lexer::new(source, &options, &handler);
        lexer.next_token(false)
    }

    #[test]
    fn plus_is_an_operator_run() {
        let tok = lex_one("+");
        assert_eq!(tok.attribute, Attribute::Operator);
        assert_eq!(tok.symbol.unwrap().as_str(), "+");
    }

    #[test]
    fn multi_char_operator_run() {
        let tok = lex_one("+*");
        assert_eq!(tok.attribute, Attribute::Operator);
        assert_eq!(tok.symbol.unwrap().as_str(), "+*");
    }

    #[test]
    fn becomes_symbol() {
        let tok = lex_one(":=");
        assert_eq!(tok.attribute, Attribute::BecomesSymbol);
    }

    #[test]
    fn bare_colon() {
        let tok = lex_one(":");
        assert_eq!(tok.attribute, Attribute::Colon);
    }
}
