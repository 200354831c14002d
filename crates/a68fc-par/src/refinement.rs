//! Component C: refinement preprocessor.
//!
//! A refinement section is introduced by a top-level `.` after the main program body:
//! everything after it is a sequence of `name : token* .`-style definitions (here,
//! definitions run up to the next defining occurrence rather than requiring their own
//! trailing dot, matching the glossary's "named code block... substituted textually at
//! its name's use site"). Each occurrence of `name` as a plain identifier in the main
//! body is spliced out for that definition's token run. A refinement may be applied at
//! most once; a second use is an error, and a definition nobody applied is a warning.
//!
//! This pass works over the flat token stream the scanner produced, before the arena
//! or the symbol table exist — refinement substitution is pure text splicing, same as
//! the original's "copy tokens in place" design, just expressed as `Vec<Token>` surgery
//! instead of pointer splicing.

use a68fc_util::diagnostic::Handler;
use a68fc_util::{Span, Symbol};

use a68fc_lex::{Attribute, Token};

struct Refinement {
    tokens: Vec<Token>,
    definition_span: Span,
    applied: bool,
}

fn depth_delta(attribute: Attribute) -> i32 {
    use Attribute::*;
    match attribute {
        OpenSymbol | SubSymbol | BeginSymbol | FormatDelimSymbol => 1,
        CloseSymbol | BusSymbol | EndSymbol => -1,
        _ => 0,
    }
}

/// Splits `tokens` at the first depth-0 `.`, if any, and returns `(head, refinements)`.
/// `head` is the main program's token run with refinement applications already spliced
/// in; `refinements` reports which definitions were never applied (for a warning the
/// caller emits once it has a real span to attach).
pub fn preprocess_refinements(tokens: Vec<Token>, handler: &Handler) -> Vec<Token> {
    let split = find_top_level_full_stop(&tokens);
    let Some(split) = split else {
        return tokens;
    };

    let head = &tokens[..split];
    let tail = &tokens[split + 1..];

    let mut refinements: Vec<(Symbol, Refinement)> = Vec::new();
    let mut i = 0;
    while i + 1 < tail.len() {
        let name_tok = &tail[i];
        let colon_tok = &tail[i + 1];
        if name_tok.attribute != Attribute::Identifier || colon_tok.attribute != Attribute::Colon {
            i += 1;
            continue;
        }
        let name = name_tok.symbol.expect("identifier token always carries a symbol");
        let body_start = i + 2;
        let mut j = body_start;
        while j + 1 < tail.len()
            && !(tail[j].attribute == Attribute::Identifier && tail[j + 1].attribute == Attribute::Colon)
        {
            j += 1;
        }
        let body_end = if j + 1 < tail.len() { j } else { tail.len() };
        let body = tail[body_start..body_end].to_vec();
        let definition_span = name_tok.span;

        if refinements.iter().any(|(n, _)| *n == name) {
            handler.error(
                format!("refinement '{}' defined more than once", name.as_str()),
                definition_span,
            );
        } else {
            refinements.push((
                name,
                Refinement {
                    tokens: body,
                    definition_span,
                    applied: false,
                },
            ));
        }
        i = body_end;
    }

    let mut out = Vec::with_capacity(head.len());
    for tok in head {
        if tok.attribute == Attribute::Identifier {
            if let Some(sym) = tok.symbol {
                if let Some((_, refinement)) = refinements.iter_mut().find(|(n, _)| *n == sym) {
                    if refinement.applied {
                        handler.error(
                            format!("refinement '{}' applied more than once", sym.as_str()),
                            tok.span,
                        );
                        out.push(*tok);
                    } else {
                        refinement.applied = true;
                        out.extend(refinement.tokens.iter().copied());
                    }
                    continue;
                }
            }
        }
        out.push(*tok);
    }

    for (name, refinement) in &refinements {
        if !refinement.applied {
            handler.warning(
                format!("refinement '{}' is never applied", name.as_str()),
                refinement.definition_span,
            );
        }
    }

    out
}

fn find_top_level_full_stop(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0;
    for (idx, tok) in tokens.iter().enumerate() {
        if tok.attribute == Attribute::FullStopSymbol && depth == 0 {
            return Some(idx);
        }
        depth += depth_delta(tok.attribute);
    }
    None
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
    fn no_refinement_section_is_a_no_op() {
        let tokens = tokenize("SKIP");
        let handler = Handler::new();
        let out = preprocess_refinements(tokens.clone(), &handler);
        assert_eq!(out.len(), tokens.len());
        assert!(!handler.has_errors());
    }

    #[test]
    fn refinement_is_spliced_at_use_site() {
        let tokens = tokenize("greet . greet : SKIP");
        let handler = Handler::new();
        let out = preprocess_refinements(tokens, &handler);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].attribute, Attribute::SkipSymbol);
        assert!(!handler.has_errors());
    }

    #[test]
    fn unused_refinement_warns() {
        let tokens = tokenize("SKIP . unused : SKIP");
        let handler = Handler::new();
        preprocess_refinements(tokens, &handler);
        assert!(handler.warning_count() >= 1);
    }

    #[test]
    fn duplicate_definition_is_an_error() {
        let tokens = tokenize("SKIP . r : SKIP r : SKIP");
        let handler = Handler::new();
        preprocess_refinements(tokens, &handler);
        assert!(handler.has_errors());
    }

    #[test]
    fn reapplication_is_an_error() {
        let tokens = tokenize("r + r . r : SKIP");
        let handler = Handler::new();
        preprocess_refinements(tokens, &handler);
        assert!(handler.has_errors());
    }
}
