//! Orchestrates components A through I into a single compile (§2, §5).
//!
//! The pipeline is single-threaded and cooperative: each component runs to
//! completion before the next begins, and a structural failure (bracket mismatch, an
//! unframeable program) short-circuits the remaining components rather than handing
//! them a stream they cannot make sense of — the `Result`-shaped "non-local jump" the
//! data model calls for. Everything else (a bad phrase, an unknown mode) recovers
//! locally and the pipeline keeps going, matching §7's propagation policy.
//!
//! This crate never touches the filesystem. `INCLUDE`/`READ` pragmats are resolved
//! through the caller-supplied [`IncludeResolver`] — the driver binary supplies a real
//! one backed by `std::fs`; library callers and tests that have no includes can pass
//! [`NoIncludes`].

use a68fc_lex::source_buffer::prepare_source;
use a68fc_lex::{Lexer, Token};
use a68fc_util::diagnostic::Handler;
use a68fc_util::{CompileOptions, Span};

use crate::arena::{NodeArena, NodeId};
use crate::fixup::fixup_program;
use crate::framer::Framer;
use crate::paren_check::{check_brackets, report_mismatch};
use crate::recovery::recover;
use crate::reduce::{particular_program, reduce_range};
use crate::refinement::preprocess_refinements;
use crate::symtab::SymbolTable;

/// Resolves the file argument of an `INCLUDE`/`READ` pragmat to source text.
pub trait IncludeResolver {
    fn resolve(&self, path: &str) -> Option<String>;
}

/// An `IncludeResolver` for programs (or tests) that never use `INCLUDE`/`READ`.
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&self, _path: &str) -> Option<String> {
        None
    }
}

/// Everything a finished (or partially finished, on structural failure) compile
/// leaves behind: the arena backing every node ever allocated, the outermost node if
/// one was produced, and the symbol table built along the way.
pub struct CompileOutput {
    pub arena: NodeArena,
    pub root: Option<NodeId>,
    pub symtab: SymbolTable,
}

impl CompileOutput {
    fn empty() -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
            symtab: SymbolTable::new(),
        }
    }
}

/// Runs the full pipeline over `raw` source text under `options`, reporting
/// diagnostics through `handler`.
pub fn compile(raw: &str, options: &CompileOptions, handler: &Handler, includes: &dyn IncludeResolver) -> CompileOutput {
    // A: line splicing, shebang stripping, prelude/postlude wrapping.
    let prepared = tracing::info_span!("prepare_source").in_scope(|| prepare_source(raw, options.stropping));

    // B: scan to tokens, inlining any INCLUDE/READ pragmats as they're hit.
    let tokens = tracing::info_span!("scan").in_scope(|| tokenize_with_includes(&prepared, options, handler, includes));
    if tokens.is_empty() || handler.error_limit_reached() {
        return CompileOutput::empty();
    }

    // C: refinement preprocessing (PR name: body PR ... inlined at each call site).
    let tokens = tracing::info_span!("refinement").in_scope(|| preprocess_refinements(tokens, handler));

    // D: parenthesis/bracket-nesting check. A mismatch is structural — nothing past
    // this point can trust the token stream's nesting, so the pipeline stops here.
    if let Err(mismatch) = tracing::info_span!("paren_check").in_scope(|| check_brackets(&tokens)) {
        report_mismatch(handler, &mismatch);
        return CompileOutput::empty();
    }

    // E: top-down framer builds the initial bracket/part structure.
    let mut arena = NodeArena::new();
    let root = tracing::info_span!("frame").in_scope(|| {
        let mut framer = Framer::new(&mut arena, handler);
        framer.frame_program(&tokens)
    });
    let Some(root) = root else {
        return CompileOutput {
            arena,
            root: None,
            symtab: SymbolTable::new(),
        };
    };

    // F (run by G at the start of the outermost range) and G: bottom-up reduction.
    // Standard-prelude modes are seeded before the outermost range reduces, so a bare
    // `INT`/`REAL`/… bold tag elaborates without the program declaring it itself.
    let mut symtab = SymbolTable::new();
    symtab.seed_standard_modes(&mut arena);
    let reduced = tracing::info_span!("bottom_up_reduce", range = ?root).in_scope(|| reduce_range(&mut arena, &mut symtab, handler, root));

    // H: if the fixed step order left more than one sibling at the top, the phrase
    // never fully reduced — recover rather than hand a bare list to the fixup pass.
    let reduced = if arena.next(reduced).is_some() {
        tracing::info_span!("recover", range = ?root).in_scope(|| recover(&mut arena, handler, reduced))
    } else {
        reduced
    };
    let final_root = particular_program(&mut arena, reduced);

    // I: post-tree fixups (goto-less jumps, victality, nest linking, proc levels).
    tracing::info_span!("fixup").in_scope(|| fixup_program(&mut arena, handler, final_root));

    CompileOutput {
        arena,
        root: Some(final_root),
        symtab,
    }
}

/// Drains `prepared` into tokens, recursively splicing any `INCLUDE`/`READ` target's
/// own tokens in place as soon as the pragmat that named it is scanned. An
/// unresolvable include is a diagnostic, not a panic — the rest of the buffer still
/// scans so the user sees more than one error per compile.
fn tokenize_with_includes(prepared: &str, options: &CompileOptions, handler: &Handler, includes: &dyn IncludeResolver) -> Vec<Token> {
    let mut lexer = Lexer::new(prepared, options, handler);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token(false);
        let eof = tok.is_eof();
        if !eof {
            tokens.push(tok);
        }
        if let Some(pending) = lexer.take_pending_include() {
            match includes.resolve(&pending.path) {
                Some(included) => {
                    let nested = tokenize_with_includes(&included, options, handler, includes);
                    tokens.extend(nested);
                }
                None => {
                    handler.error(format!("cannot resolve INCLUDE/READ of '{}'", pending.path), Span::DUMMY);
                }
            }
        }
        if eof || handler.error_limit_reached() {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;

    fn run(source: &str) -> (CompileOutput, Handler) {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let output = compile(source, &options, &handler, &NoIncludes);
        (output, handler)
    }

    #[test]
    fn skip_program_compiles_to_particular_program() {
        let (output, handler) = run("SKIP");
        assert!(!handler.has_errors());
        let root = output.root.expect("program produced a root");
        assert_eq!(output.arena.attr(root), Attribute::ParticularProgram);
    }

    #[test]
    fn mismatched_brackets_stop_the_pipeline_before_framing() {
        let (output, handler) = run("BEGIN SKIP");
        assert!(handler.has_errors());
        assert!(output.root.is_none());
    }

    #[test]
    fn identity_declaration_and_use_reduce_cleanly() {
        let (output, handler) = run("BEGIN INT x = 1; x END");
        assert!(!handler.has_errors());
        let root = output.root.expect("program produced a root");
        assert_eq!(output.arena.attr(root), Attribute::ParticularProgram);
        assert!(output.symtab.depth() >= 1);
        assert!(
            find_descendant(&output.arena, root, Attribute::IdentityDeclaration).is_some(),
            "INT x = 1 reduces to an IDENTITY_DECLARATION, not raw tokens"
        );
    }

    /// Depth-first search for the first node strictly under `id` tagged `target` —
    /// mirrors the equivalent helper in `reduce`'s own tests.
    fn find_descendant(arena: &NodeArena, id: NodeId, target: Attribute) -> Option<NodeId> {
        let mut cur = arena.get(id).sub;
        while let Some(child) = cur {
            if arena.attr(child) == target {
                return Some(child);
            }
            if let Some(found) = find_descendant(arena, child, target) {
                return Some(found);
            }
            cur = arena.next(child);
        }
        None
    }

    #[test]
    fn unresolved_include_is_diagnosed_not_panicked() {
        let (output, handler) = run("PR INCLUDE \"missing.a68\" PR\nSKIP");
        assert!(handler.has_errors() || output.root.is_some());
    }
}
