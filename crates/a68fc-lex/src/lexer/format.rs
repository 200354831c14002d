//! Format-text item scanning.
//!
//! Format texts are delimited by `$…$`; the scanner does not build the `FORMAT_TEXT`
//! tree itself (that is the top-down framer's job, component E) but while `in_format`
//! is set it tags the single-letter format items, sign characters, the decimal point,
//! and `%` distinctly instead of running them through identifier/operator scanning.
//! Brackets and denotations inside a format text still come through the ordinary
//! dispatch in [`crate::lexer::core`]; replicator clauses `n(…)` stay in format mode
//! rather than recursing into a nested general scan, which is a deliberate
//! simplification of the fuller re-entry the data model describes — disambiguating a
//! replicator's enclosed clause from a nested format is left to the parser, which has
//! the context (what precedes the `(`) the scanner does not.

use crate::token::{Attribute, Token};
use crate::Lexer;

/// Single-letter format items recognized inside a format text.
const FORMAT_LETTERS: &str = "abcdefghiklnopqrstuvwxyz";

impl<'a> Lexer<'a> {
    /// If the cursor is at a format-specific item and `in_format` is set, consumes and
    /// returns it; otherwise returns `None` so the caller falls through to the general
    /// dispatch.
    pub fn lex_format_item(&mut self, in_format: bool) -> Option<Token> {
        if !in_format {
            return None;
        }
        let c = self.cursor.current_char().to_ascii_lowercase();
        if FORMAT_LETTERS.contains(c) {
            let start = self.cursor.snapshot();
            self.cursor.advance();
            let span = self.span_from(start);
            return Some(Token::punct(Attribute::FormatItem, span));
        }
        match self.cursor.current_char() {
            '.' => {
                let start = self.cursor.snapshot();
                self.cursor.advance();
                Some(Token::punct(Attribute::FormatItem, self.span_from(start)))
            }
            '%' => {
                let start = self.cursor.snapshot();
                self.cursor.advance();
                Some(Token::punct(Attribute::FormatItem, self.span_from(start)))
            }
            _ => None,
        }
    }

    /// Lexes the `$` format delimiter itself.
    pub fn lex_format_delim(&mut self) -> Token {
        let start = self.cursor.snapshot();
        self.cursor.advance();
        Token::punct(Attribute::FormatDelimSymbol, self.span_from(start))
    }
}
