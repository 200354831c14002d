//! String denotation lexing.
//!
//! Algol 68 has no backslash escapes: an embedded `"` is written as a doubled quote
//! (`""`). There is no separate character-literal syntax or raw-string syntax — a
//! one-character string denotation stands in for what other languages call a char.

use crate::token::{Attribute, Token};
use crate::Lexer;
use a68fc_util::Symbol;

impl<'a> Lexer<'a> {
    /// Lexes a `"…"` string denotation with doubled-quote escaping.
    pub fn lex_string(&mut self) -> Token {
        let start = self.cursor.snapshot();
        self.cursor.advance(); // opening quote

        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                self.handler.error(
                    "unterminated string denotation".to_string(),
                    self.span_from(start),
                );
                break;
            }
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    if self.cursor.current_char() == '"' {
                        value.push('"');
                        self.cursor.advance();
                    } else {
                        break;
                    }
                }
                '\n' => {
                    self.handler.error(
                        "unterminated string denotation".to_string(),
                        self.span_from(start),
                    );
                    break;
                }
                c => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }

        Token::text(Attribute::StringDenotation, Symbol::intern(&value), self.span_from(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::diagnostic::Handler;
    use a68fc_util::CompileOptions;

    fn lex_one(source: &str) -> (Token, Handler) {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = crate::Lexer::new(source, &options, &handler);
        let tok = lexer.next_token(false);
        drop(lexer);
        (tok, handler)
    }

    #[test]
    fn plain_string() {
        let (tok, _) = lex_one("\"hello\"");
        assert_eq!(tok.attribute, Attribute::StringDenotation);
        assert_eq!(tok.symbol.unwrap().as_str(), "hello");
    }

    #[test]
    fn doubled_quote_is_embedded_quote() {
        let (tok, _) = lex_one("\"say \"\"hi\"\"\"");
        assert_eq!(tok.symbol.unwrap().as_str(), "say \"hi\"");
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (_, handler) = lex_one("\"abc");
        assert!(handler.has_errors());
    }
}
