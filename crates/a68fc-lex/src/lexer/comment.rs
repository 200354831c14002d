//! Comment and pragmat recognition.
//!
//! Comments come in three bracketing spellings — `#…#`, `CO…CO`, `COMMENT…COMMENT` — none
//! of which nest; an unterminated comment is a fatal scan error. Pragmats (`PR…PR`,
//! `PRAGMAT…PRAGMAT`) are scanned the same way but their content is inspected for
//! `INCLUDE`/`READ`/`PREPROCESSOR`/`NOPREPROCESSOR`. `INCLUDE`/`READ` record a pending
//! request the pipeline driver resolves (opening the file, running the scanner over it,
//! splicing the resulting tokens in place) — cycle detection lives at that level, since
//! only the driver knows which files have already been visited.

use crate::Lexer;
use a68fc_util::options::StroppingMode;

/// A request to splice the tokens of another source file in at this point, recorded by
/// an `INCLUDE`/`READ` pragmat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingInclude {
    pub path: String,
}

impl<'a> Lexer<'a> {
    /// Scans one bold word (`CO`, `COMMENT`, `PR`, `PRAGMAT`, `TO`, …) at the cursor
    /// without regard to whether it is a recognized keyword, consuming it. Returns
    /// `None` if the cursor is not at the start of a bold word in the active stropping
    /// mode.
    fn scan_bold_word(&mut self) -> Option<String> {
        match self.options.stropping {
            StroppingMode::Upper => {
                let c = self.cursor.current_char();
                if c.is_ascii_uppercase() || c == '_' {
                    let start = self.cursor.position();
                    while {
                        let c = self.cursor.current_char();
                        c.is_ascii_uppercase() || c == '_'
                    } {
                        self.cursor.advance();
                    }
                    Some(self.cursor.slice_from(start).to_string())
                } else {
                    None
                }
            }
            StroppingMode::Quote => {
                if self.cursor.current_char() == '\'' {
                    self.cursor.advance();
                    let start = self.cursor.position();
                    while self.cursor.current_char() != '\'' && !self.cursor.is_at_end() {
                        self.cursor.advance();
                    }
                    let text = self.cursor.slice_from(start).to_ascii_uppercase();
                    if self.cursor.current_char() == '\'' {
                        self.cursor.advance();
                    }
                    Some(text)
                } else {
                    None
                }
            }
        }
    }

    /// Non-consuming lookahead for [`scan_bold_word`].
    pub(crate) fn peek_bold_word(&mut self) -> Option<String> {
        let mark = self.cursor.snapshot();
        let result = self.scan_bold_word();
        self.cursor.restore(mark);
        result
    }

    /// Consumes the bold word the caller has already confirmed (via `peek_bold_word`)
    /// is present at the cursor.
    pub(crate) fn consume_bold_word(&mut self, _expected: &str) {
        self.scan_bold_word();
    }

    /// Skips whitespace, comments, and pragmats preceding the next significant token.
    pub fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.cursor.is_at_end() {
                return;
            }
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' | '\x0c' => {
                    self.cursor.advance();
                }
                '#' => self.skip_hash_comment(),
                _ => {
                    if let Some(word) = self.peek_bold_word() {
                        match word.as_str() {
                            "CO" => {
                                self.consume_bold_word("CO");
                                self.skip_word_comment("CO");
                            }
                            "COMMENT" => {
                                self.consume_bold_word("COMMENT");
                                self.skip_word_comment("COMMENT");
                            }
                            "PR" => {
                                self.consume_bold_word("PR");
                                self.skip_pragmat("PR");
                            }
                            "PRAGMAT" => {
                                self.consume_bold_word("PRAGMAT");
                                self.skip_pragmat("PRAGMAT");
                            }
                            _ => return,
                        }
                    } else {
                        return;
                    }
                }
            }
        }
    }

    fn skip_hash_comment(&mut self) {
        let start = self.cursor.snapshot();
        self.cursor.advance();
        while self.cursor.current_char() != '#' && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        if self.cursor.is_at_end() {
            self.handler.error(
                "unterminated comment (missing closing '#')".to_string(),
                self.span_from(start),
            );
        } else {
            self.cursor.advance();
        }
    }

    fn skip_word_comment(&mut self, opening: &str) {
        let start = self.cursor.snapshot();
        loop {
            if self.cursor.is_at_end() {
                self.handler.error(
                    format!("unterminated comment (missing closing '{}')", opening),
                    self.span_from(start),
                );
                return;
            }
            if self.peek_bold_word().as_deref() == Some(opening) {
                self.consume_bold_word(opening);
                return;
            }
            self.cursor.advance();
        }
    }

    fn skip_pragmat(&mut self, opening: &str) {
        let start = self.cursor.snapshot();
        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                self.handler.error(
                    format!("unterminated pragmat (missing closing '{}')", opening),
                    self.span_from(start),
                );
                break;
            }
            if self.peek_bold_word().as_deref() == Some(opening) {
                self.consume_bold_word(opening);
                break;
            }
            content.push(self.cursor.current_char());
            self.cursor.advance();
        }
        self.handle_pragmat_content(&content);
    }

    fn handle_pragmat_content(&mut self, content: &str) {
        let upper = content.to_ascii_uppercase();
        if upper.contains("NOPREPROCESSOR") {
            self.pragmats_enabled = false;
            return;
        }
        if upper.contains("PREPROCESSOR") {
            self.pragmats_enabled = true;
            return;
        }
        if !self.pragmats_enabled {
            return;
        }
        for keyword in ["INCLUDE", "READ"] {
            if let Some(pos) = upper.find(keyword) {
                if let Some(path) = extract_quoted_path(&content[pos + keyword.len()..]) {
                    self.pending_include = Some(PendingInclude { path });
                }
                return;
            }
        }
    }
}

fn extract_quoted_path(rest: &str) -> Option<String> {
    let start = rest.find('"')? + 1;
    let end = rest[start..].find('"')? + start;
    Some(rest[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::diagnostic::Handler;
    use a68fc_util::CompileOptions;

    fn run(source: &str) -> crate::token::Token {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = crate::Lexer::new(source, &options, &handler);
        lexer.next_token(false)
    }

    #[test]
    fn hash_comment_is_skipped() {
        let tok = run("# a comment # BEGIN");
        assert_eq!(tok.attribute, crate::token::Attribute::BeginSymbol);
    }

    #[test]
    fn co_comment_is_skipped() {
        let tok = run("CO a comment CO BEGIN");
        assert_eq!(tok.attribute, crate::token::Attribute::BeginSymbol);
    }

    #[test]
    fn comment_word_comment_is_skipped() {
        let tok = run("COMMENT long form COMMENT BEGIN");
        assert_eq!(tok.attribute, crate::token::Attribute::BeginSymbol);
    }

    #[test]
    fn pragmat_include_is_recorded() {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = crate::Lexer::new("PR INCLUDE \"prelude.a68\" PR BEGIN", &options, &handler);
        let tok = lexer.next_token(false);
        assert_eq!(tok.attribute, crate::token::Attribute::BeginSymbol);
        let pending = lexer.take_pending_include().unwrap();
        assert_eq!(pending.path, "prelude.a68");
    }

    #[test]
    fn unterminated_hash_comment_reports_error() {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = crate::Lexer::new("# never closed", &options, &handler);
        lexer.next_token(false);
        assert!(handler.has_errors());
    }
}
