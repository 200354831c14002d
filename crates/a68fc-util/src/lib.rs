//! a68fc-util - Core utilities and foundation types shared by every front-end crate.
//!
//! This crate provides the plumbing the rest of the compiler is built on: interned
//! symbols ([`symbol`]), source positions and the source map ([`span`]), the diagnostic
//! collector ([`diagnostic`]), typed index vectors ([`index_vec`]), compile-time options
//! ([`options`]) and the shared error types ([`error`]).
//!
//! None of these types know anything about Algol 68 syntax; they are the same kind of
//! foundation layer any hand-written recursive-descent or table-driven front end needs.

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod options;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticCode, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use options::{BracketEquivalence, CompileOptions, StroppingMode};
pub use span::{FileId, Span};
pub use symbol::Symbol;

// Re-export commonly used hash collection types so downstream crates do not need to
// depend on `rustc-hash` directly.
pub use rustc_hash::{FxHashMap, FxHashSet};
