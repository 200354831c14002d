//! The parser: components C through I of the front end (§2).
//!
//! `a68fc-lex` turns source text into a flat stream of [`a68fc_lex::Token`]s; this
//! crate takes it from there — refinement preprocessing, the parenthesis/bracket
//! check, the top-down framer, the definition extractor, the bottom-up reducer, error
//! recovery, and the post-tree fixups, in the fixed order [`pipeline::compile`]
//! drives. [`pipeline`] is the crate's single public entry point; everything else is
//! exposed mainly so the driver binary can walk the finished tree and so each phase
//! can be unit-tested on its own.

pub mod arena;
pub mod attribute;
pub mod defs;
pub mod fixup;
pub mod framer;
pub mod paren_check;
pub mod pipeline;
pub mod recovery;
pub mod reduce;
pub mod refinement;
pub mod symtab;

pub use arena::{Node, NodeArena, NodeId};
pub use attribute::{Attribute, AttributeExt};
pub use pipeline::{compile, CompileOutput, IncludeResolver, NoIncludes};
pub use symtab::{SymbolTable, TagEntry, TagKind};
