//! The scanner core: component B of the front end.
//!
//! `Lexer` wraps a [`crate::cursor::Cursor`] over an already-spliced source buffer
//! (see [`crate::source_buffer`]) and produces one [`Token`] per call to
//! [`Lexer::next_token`], dispatching on the current character and the active
//! stropping mode. It carries no global state: the diagnostic handler and compile
//! options are borrowed for the lexer's lifetime, exactly as the rest of the pipeline
//! threads them explicitly rather than through statics.

use crate::cursor::{Cursor, CursorSnapshot};
use crate::lexer::comment::PendingInclude;
use crate::token::{Attribute, Token};
use a68fc_util::diagnostic::Handler;
use a68fc_util::span::Span;
use a68fc_util::CompileOptions;

pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) handler: &'a Handler,
    pub(crate) options: &'a CompileOptions,
    pub(crate) pragmats_enabled: bool,
    pub(crate) pending_include: Option<PendingInclude>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, options: &'a CompileOptions, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            options,
            pragmats_enabled: options.pragmats_enabled,
            pending_include: None,
        }
    }

    /// Takes (and clears) a pending `INCLUDE`/`READ` request recorded by the most
    /// recent pragmat, if any. The driver is expected to check this after every call
    /// to `next_token` and splice the named file's tokens in before continuing.
    pub fn take_pending_include(&mut self) -> Option<PendingInclude> {
        self.pending_include.take()
    }

    pub fn line(&self) -> u32 {
        self.cursor.line()
    }

    pub fn column(&self) -> u32 {
        self.cursor.column()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub(crate) fn span_from(&self, start: CursorSnapshot) -> Span {
        Span::new(start.position, self.cursor.position(), start.line, start.column)
    }

    fn bracket_equivalence(&self) -> bool {
        self.options.bracket_equivalence.is_allowed()
    }

    /// Produces the next token. `in_format` selects between general scanning and
    /// format-text scanning (single-letter format items, etc.) — the caller (the
    /// top-down framer) tracks whether it is currently inside a `$…$` pair.
    pub fn next_token(&mut self, in_format: bool) -> Token {
        self.skip_whitespace_and_comments();

        if self.handler.error_limit_reached() {
            let start = self.cursor.snapshot();
            return Token::punct(Attribute::ErrorSymbol, self.span_from(start));
        }

        if self.cursor.is_at_end() {
            let start = self.cursor.snapshot();
            return Token::punct(Attribute::Eof, self.span_from(start));
        }

        if let Some(tok) = self.lex_format_item(in_format) {
            return tok;
        }

        let c = self.cursor.current_char();
        match c {
            '$' => self.lex_format_delim(),
            '"' => self.lex_string(),
            '(' => self.lex_punct(Attribute::OpenSymbol),
            ')' => self.lex_punct(Attribute::CloseSymbol),
            '[' if self.bracket_equivalence() => self.lex_punct(Attribute::OpenSymbol),
            ']' if self.bracket_equivalence() => self.lex_punct(Attribute::CloseSymbol),
            '{' if self.bracket_equivalence() => self.lex_punct(Attribute::OpenSymbol),
            '}' if self.bracket_equivalence() => self.lex_punct(Attribute::CloseSymbol),
            '[' => self.lex_punct(Attribute::SubSymbol),
            ']' => self.lex_punct(Attribute::BusSymbol),
            ';' => self.lex_punct(Attribute::Semicolon),
            ',' => self.lex_punct(Attribute::Comma),
            '@' => self.lex_punct(Attribute::AtSymbol),
            '.' => self.lex_punct(Attribute::FullStopSymbol),
            ':' => self.lex_colon(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_ascii_uppercase() || c == '_' || c == '\'' => self.lex_identifier_or_bold_tag(),
            c if c.is_ascii_lowercase() => self.lex_identifier_or_bold_tag(),
            c if crate::lexer::operator::is_monad_char(c) => self.lex_operator(),
            other => {
                let start = self.cursor.snapshot();
                self.cursor.advance();
                self.handler.error(
                    format!("unrecognized character {:?}", other),
                    self.span_from(start),
                );
                Token::punct(Attribute::ErrorSymbol, self.span_from(start))
            }
        }
    }

    /// Tokenizes the whole buffer in general (non-format) mode, stopping at `Eof`.
    /// Included-file splicing is the caller's responsibility (see
    /// [`Lexer::take_pending_include`]); this just drains one buffer.
    pub fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token(false);
            let eof = tok.is_eof();
            tokens.push(tok);
            if eof || self.handler.error_limit_reached() {
                break;
            }
        }
        tokens
    }
}
