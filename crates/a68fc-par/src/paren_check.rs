//! Component D: parenthesis checker.
//!
//! A strict stack-based check over the whole (post-refinement) token stream. Every
//! opener pushes its expected closer; every closer must match the top of the stack.
//! On the first mismatch (or an opener left unclosed at end of stream), one diagnostic
//! is emitted, located at the offending token, and the phase is abandoned — the spec
//! calls this a "long jump out"; here that is simply returning `Err` instead of `Ok`
//! from [`check_brackets`], letting `?` do the unwinding (§5's design note).

use a68fc_util::diagnostic::Handler;
use a68fc_util::Span;

use a68fc_lex::{Attribute, Token};

/// The bracket kinds the checker tracks, used to name the expected closer in
/// diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BracketKind {
    BeginEnd,
    Paren,
    SubBus,
    Format,
}

impl BracketKind {
    fn opener_name(self) -> &'static str {
        match self {
            BracketKind::BeginEnd => "BEGIN",
            BracketKind::Paren => "(",
            BracketKind::SubBus => "[",
            BracketKind::Format => "$",
        }
    }

    fn closer_name(self) -> &'static str {
        match self {
            BracketKind::BeginEnd => "END",
            BracketKind::Paren => ")",
            BracketKind::SubBus => "]",
            BracketKind::Format => "$",
        }
    }
}

fn opener_kind(attribute: Attribute) -> Option<BracketKind> {
    match attribute {
        Attribute::BeginSymbol => Some(BracketKind::BeginEnd),
        Attribute::OpenSymbol => Some(BracketKind::Paren),
        Attribute::SubSymbol => Some(BracketKind::SubBus),
        Attribute::FormatDelimSymbol => Some(BracketKind::Format),
        _ => None,
    }
}

fn closer_kind(attribute: Attribute) -> Option<BracketKind> {
    match attribute {
        Attribute::EndSymbol => Some(BracketKind::BeginEnd),
        Attribute::CloseSymbol => Some(BracketKind::Paren),
        Attribute::BusSymbol => Some(BracketKind::SubBus),
        Attribute::FormatDelimSymbol => Some(BracketKind::Format),
        _ => None,
    }
}

/// Raised when the token stream's brackets do not nest correctly; the bracket-check
/// phase is abandoned when this is returned (§7: "Bracket mismatch... aborts
/// bracket-check phase").
#[derive(Debug)]
pub struct BracketMismatch {
    pub message: String,
    pub span: Span,
}

/// Verifies every `BEGIN/END`, `(/)`, `[/]`/`{/}` (already normalized to `(/)` by the
/// scanner when bracket equivalence is on, or tracked as `SubSymbol`/`BusSymbol`
/// otherwise), and `$…$` pair nests correctly across the whole stream.
pub fn check_brackets(tokens: &[Token]) -> Result<(), BracketMismatch> {
    let mut stack: Vec<(BracketKind, Span)> = Vec::new();

    for tok in tokens {
        if let Some(kind) = opener_kind(tok.attribute) {
            // `$` is both opener and closer; a second `$` while one is already open
            // closes it rather than nesting (format texts do not nest, §4.B).
            if kind == BracketKind::Format {
                if let Some((BracketKind::Format, _)) = stack.last() {
                    stack.pop();
                    continue;
                }
            }
            stack.push((kind, tok.span));
            continue;
        }
        if let Some(kind) = closer_kind(tok.attribute) {
            // `$` is fully handled by the opener branch above (it both opens and
            // closes); only non-format closers reach here.
            match stack.pop() {
                Some((open_kind, _)) if open_kind == kind => continue,
                Some((open_kind, open_span)) => {
                    return Err(BracketMismatch {
                        message: format!(
                            "'{}' at line {} does not match the innermost open '{}'; expected '{}'",
                            kind.closer_name(),
                            tok.span.line,
                            open_kind.opener_name(),
                            open_kind.closer_name(),
                        ),
                        span: open_span,
                    });
                }
                None => {
                    return Err(BracketMismatch {
                        message: format!("unmatched closing '{}'", kind.closer_name()),
                        span: tok.span,
                    });
                }
            }
        }
    }

    if let Some((kind, span)) = stack.pop() {
        return Err(BracketMismatch {
            message: format!(
                "'{}' at line {} without matching '{}'",
                kind.opener_name(),
                span.line,
                kind.closer_name(),
            ),
            span,
        });
    }

    Ok(())
}

/// Emits `mismatch` as one diagnostic and returns the handler's post-emission error
/// count, for callers that want to confirm a single diagnostic was added.
pub fn report_mismatch(handler: &Handler, mismatch: &BracketMismatch) {
    handler.error(mismatch.message.clone(), mismatch.span);
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::CompileOptions;

    fn tokenize(source: &str) -> Vec<Token> {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = a68fc_lex::Lexer::new(source, &options, &handler);
        let mut tokens = lexer.tokenize_all();
        tokens.pop();
        tokens
    }

    #[test]
    fn balanced_brackets_pass() {
        let tokens = tokenize("BEGIN (a + [1:2]) END");
        assert!(check_brackets(&tokens).is_ok());
    }

    #[test]
    fn missing_close_paren_is_reported_at_the_opener() {
        let tokens = tokenize("(a + b");
        let err = check_brackets(&tokens).unwrap_err();
        assert_eq!(err.span.line, tokens[0].span.line);
    }

    #[test]
    fn mismatched_closer_is_reported() {
        let tokens = tokenize("(a]");
        assert!(check_brackets(&tokens).is_err());
    }

    #[test]
    fn format_delimiters_pair_up() {
        let tokens = tokenize("$d$");
        assert!(check_brackets(&tokens).is_ok());
    }

    #[test]
    fn unmatched_end_is_reported() {
        let tokens = tokenize("SKIP END");
        assert!(check_brackets(&tokens).is_err());
    }
}
