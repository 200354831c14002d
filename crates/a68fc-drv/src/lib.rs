//! The driver: a thin CLI shim over the parser crate's pipeline (§6.1).
//!
//! Reads one source file, hand-parses a handful of flags into a [`a68fc_util::CompileOptions`],
//! runs [`a68fc_par::pipeline::compile`], and prints diagnostics to stderr in
//! `file:line:col: severity: message` form. No prelude loading, no type-checking, no
//! codegen — this crate stops exactly where the parser's output tree does.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use a68fc_par::arena::{NodeArena, NodeId};
use a68fc_par::pipeline::{compile, IncludeResolver};
use a68fc_util::diagnostic::{Handler, Level};
use a68fc_util::{BracketEquivalence, CompileOptions, StroppingMode};

/// Parsed command line.
pub struct CliArgs {
    pub input: PathBuf,
    pub options: CompileOptions,
    pub emit_tree: bool,
}

/// Hand-parses argv (excluding the program name) into a [`CliArgs`].
///
/// Recognized flags: `--quote-stropping` (default is upper stropping), `--max-errors=N`,
/// `--emit-tree`. Exactly one positional argument — the source file path — is required.
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut options = CompileOptions::default();
    let mut emit_tree = false;
    let mut input = None;

    for arg in args {
        if let Some(rest) = arg.strip_prefix("--max-errors=") {
            let n: usize = rest.parse().with_context(|| format!("invalid --max-errors value '{rest}'"))?;
            options.max_errors = Some(n);
        } else if arg == "--quote-stropping" {
            options.stropping = StroppingMode::Quote;
        } else if arg == "--no-bracket-equivalence" {
            options.bracket_equivalence = BracketEquivalence::Disallowed;
        } else if arg == "--no-pragmats" {
            options.pragmats_enabled = false;
        } else if arg == "--emit-tree" {
            emit_tree = true;
        } else if arg.starts_with("--") {
            bail!("unrecognized flag '{arg}'");
        } else if input.is_some() {
            bail!("expected exactly one source file, got an extra argument '{arg}'");
        } else {
            input = Some(PathBuf::from(arg));
        }
    }

    let input = input.ok_or_else(|| anyhow::anyhow!("expected a source file path"))?;
    Ok(CliArgs { input, options, emit_tree })
}

/// Resolves `INCLUDE`/`READ` pragmats against the filesystem, relative to the
/// including file's directory, with cycle detection over the canonicalized paths
/// visited so far.
struct FsIncludeResolver {
    base_dir: PathBuf,
    visited: std::cell::RefCell<std::collections::HashSet<PathBuf>>,
}

impl FsIncludeResolver {
    fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            visited: std::cell::RefCell::new(std::collections::HashSet::new()),
        }
    }
}

impl IncludeResolver for FsIncludeResolver {
    fn resolve(&self, path: &str) -> Option<String> {
        let candidate = self.base_dir.join(path);
        let canonical = fs::canonicalize(&candidate).ok()?;
        if !self.visited.borrow_mut().insert(canonical) {
            return None; // already included on this chain: treat as unresolvable rather than loop
        }
        fs::read_to_string(&candidate).ok()
    }
}

/// Runs a compile for `cli` and prints every collected diagnostic to stderr. Returns
/// `true` if the compile produced no errors.
pub fn run(cli: &CliArgs) -> Result<bool> {
    let source = fs::read_to_string(&cli.input).with_context(|| format!("reading {}", cli.input.display()))?;
    let base_dir = cli.input.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let includes = FsIncludeResolver::new(base_dir);

    let handler = Handler::new();
    let output = compile(&source, &cli.options, &handler, &includes);

    for diag in handler.diagnostics() {
        let severity = if diag.level == Level::Error { "error" } else { "warning" };
        eprintln!(
            "{}:{}:{}: {}: {}",
            cli.input.display(),
            diag.span.line,
            diag.span.column,
            severity,
            diag.message
        );
    }

    if cli.emit_tree {
        if let Some(root) = output.root {
            print_tree(&output.arena, root, 0);
        }
    }

    Ok(!handler.has_errors())
}

fn print_tree(arena: &NodeArena, id: NodeId, depth: usize) {
    let node = arena.get(id);
    let text = node.symbol.map(|s| format!(" {}", s.as_str())).unwrap_or_default();
    println!("{}{:?}{}", "  ".repeat(depth), node.attribute, text);
    if let Some(sub) = node.sub {
        let mut cur = Some(sub);
        while let Some(child) = cur {
            print_tree(arena, child, depth + 1);
            cur = arena.next(child);
        }
    }
}
