//! Numeric denotation lexing: integer, real, and bits denotations.
//!
//! `123` is an `IntDenotation`. A decimal point and/or a stropping-sensitive exponent
//! marker (`e`/`\` in upper stropping; `E`/`\` in quote stropping, since `e` would
//! otherwise read as part of a lowercase identifier run) turns it into a
//! `RealDenotation`. A stropping-sensitive radix letter (`r`/`R`) followed by digits
//! valid in that radix turns it into a `BitsDenotation`.

use crate::token::{Attribute, Token};
use crate::Lexer;
use a68fc_util::options::StroppingMode;
use a68fc_util::Symbol;

impl<'a> Lexer<'a> {
    fn exponent_char(&self) -> char {
        match self.options.stropping {
            StroppingMode::Upper => 'e',
            StroppingMode::Quote => 'E',
        }
    }

    fn radix_char(&self) -> char {
        match self.options.stropping {
            StroppingMode::Upper => 'r',
            StroppingMode::Quote => 'R',
        }
    }

    pub fn lex_number(&mut self) -> Token {
        let start = self.cursor.snapshot();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        if self.cursor.current_char() == self.radix_char() {
            self.cursor.advance();
            let digits_start = self.cursor.position();
            while self.cursor.current_char().is_ascii_alphanumeric() {
                self.cursor.advance();
            }
            if self.cursor.position() == digits_start {
                self.handler.error(
                    "bits denotation has no digits after radix letter".to_string(),
                    self.span_from(start),
                );
            }
            let text = self.cursor.slice_from(start.position);
            return Token::text(Attribute::BitsDenotation, Symbol::intern(text), self.span_from(start));
        }

        let mut is_real = false;

        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            is_real = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let exp = self.exponent_char();
        if self.cursor.current_char() == exp || self.cursor.current_char() == '\\' {
            let mark = self.cursor.snapshot();
            self.cursor.advance();
            if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
                self.cursor.advance();
            }
            if self.cursor.current_char().is_ascii_digit() {
                is_real = true;
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
            } else {
                self.cursor.restore(mark);
            }
        }

        let attribute = if is_real {
            Attribute::RealDenotation
        } else {
            Attribute::IntDenotation
        };
        let text = self.cursor.slice_from(start.position);
        Token::text(attribute, Symbol::intern(text), self.span_from(start))
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
    fn plain_integer() {
        let tok = lex_one("1234");
        assert_eq!(tok.attribute, Attribute::IntDenotation);
        assert_eq!(tok.symbol.unwrap().as_str(), "1234");
    }

    #[test]
    fn real_with_decimal_point() {
        let tok = lex_one("3.14");
        assert_eq!(tok.attribute, Attribute::RealDenotation);
    }

    #[test]
    fn real_with_exponent() {
        let tok = lex_one("1e10");
        assert_eq!(tok.attribute, Attribute::RealDenotation);
        assert_eq!(tok.symbol.unwrap().as_str(), "1e10");
    }

    #[test]
    fn integer_followed_by_identifier_is_not_exponent() {
        // "1" then a separate lowercase identifier "end" must not be absorbed.
        let tok = lex_one("1end");
        assert_eq!(tok.attribute, Attribute::IntDenotation);
        assert_eq!(tok.symbol.unwrap().as_str(), "1");
    }

    #[test]
    fn bits_denotation() {
        let tok = lex_one("16r1F");
        assert_eq!(tok.attribute, Attribute::BitsDenotation);
        assert_eq!(tok.symbol.unwrap().as_str(), "16r1F");
    }
}
