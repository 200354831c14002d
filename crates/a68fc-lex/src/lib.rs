//! a68fc-lex - Source buffer and scanner (components A and B of the front end).
//!
//! This crate turns raw source bytes into a token stream tagged with the shared
//! [`Attribute`](token::Attribute) enumeration that `a68fc-par` also uses to tag tree
//! nodes once the reducer builds non-terminals — scanning and parsing share one tagged
//! model end to end, per the data-model design note.
//!
//! Pipeline within this crate:
//! 1. [`source_buffer`] reads the whole file, splices backslash line continuations,
//!    strips a leading `#!`, and brackets the text with a stropping-dependent
//!    prelude/postlude.
//! 2. [`cursor`] walks the prepared text character by character with line/column
//!    tracking and a cheap save/restore snapshot for lookahead.
//! 3. [`lexer`] dispatches on the current character (and the active stropping mode) to
//!    produce one [`token::Token`] at a time: [`lexer::identifier`] for bold
//!    tags/identifiers, [`lexer::number`] for numeric denotations, [`lexer::string`]
//!    for string denotations, [`lexer::operator`] for MONAD-character-set operator
//!    spellings, [`lexer::comment`] for comment/pragmat/`INCLUDE` recognition, and
//!    [`lexer::format`] for format-text items.
//! 4. [`keyword`] holds the stropping-aware table of reserved structural words.

pub mod cursor;
pub mod keyword;
pub mod lexer;
pub mod source_buffer;
pub mod token;
pub mod unicode;

pub use lexer::{Lexer, PendingInclude};
pub use token::{Attribute, Token};

mod edge_cases;
