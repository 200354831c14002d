//! Range-scoped symbol table (§3 "Symbol table").
//!
//! One table per range (closed-clause level). Tables form a stack paralleling range
//! nesting; lookup walks outward from the innermost range to the standard-prelude
//! range at the bottom. A tag entered by the definition extractor (component F) is
//! visible to every use in its range before the bottom-up reducer looks at them,
//! because F always runs to completion for a range before G reduces that range's body.

use a68fc_util::{FxHashMap, Span, Symbol};

use crate::arena::{NodeArena, NodeId};
use crate::attribute::Attribute;

/// The four kinds of tag a range's table can hold (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// A mode name introduced by `MODE name = declarer`.
    Indicant,
    /// An operator priority introduced by `PRIO op = k`.
    Priority,
    /// An operator spelling introduced by `OP op = routine-text`.
    Operator,
    /// An identifier — including labels — introduced by an identity/variable/
    /// procedure declaration or a defining label occurrence.
    Identifier,
}

/// One entry in a range's table.
#[derive(Clone, Debug)]
pub struct TagEntry {
    pub kind: TagKind,
    /// For `Priority`: the declared priority (1..=9, clamped). For `Operator`
    /// occurrences found later, this is where the priority is read back from.
    pub priority: Option<u8>,
    /// The node that introduced this tag (its defining occurrence).
    pub defining_node: NodeId,
    pub span: Span,
}

/// A single range's table: up to one entry per `(kind, name)` pair.
#[derive(Default)]
pub struct Scope {
    entries: FxHashMap<(TagKind, Symbol), TagEntry>,
}

impl Scope {
    fn new() -> Self {
        Self::default()
    }
}

/// The stack of ranges currently open, innermost last. Standard-prelude entries (if
/// any) live in the bottommost scope, pushed once before the program's own ranges.
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    /// Opens a new range, e.g. on entering a closed/serial/enquiry clause.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Closes the innermost range. Panics if called more times than `push_scope` —
    /// that would be a bug in the caller's range bookkeeping, not a user error.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the standard-prelude scope");
        self.scopes.pop();
    }

    /// Enters a tag in the innermost range. Returns the previous entry, if any, so the
    /// caller can diagnose a redefinition.
    pub fn define(&mut self, kind: TagKind, name: Symbol, entry: TagEntry) -> Option<TagEntry> {
        self.scopes
            .last_mut()
            .expect("at least one scope always open")
            .entries
            .insert((kind, name), entry)
    }

    /// Looks up `name` of kind `kind`, walking from the innermost range outward.
    pub fn lookup(&self, kind: TagKind, name: Symbol) -> Option<&TagEntry> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.entries.get(&(kind, name)))
    }

    /// True if `name` is declared as `kind` anywhere visible from the current range.
    pub fn is_declared(&self, kind: TagKind, name: Symbol) -> bool {
        self.lookup(kind, name).is_some()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The standard-prelude mode names every range sits below, per §3's prelude range.
    const STANDARD_MODES: &'static [&'static str] =
        &["INT", "REAL", "BOOL", "CHAR", "STRING", "COMPL", "BITS", "BYTES", "FORMAT", "FILE", "VOID", "SEMA"];

    /// Enters each standard-prelude mode name as an `Indicant` in the bottommost scope,
    /// so `elaborate_bold_tags` resolves a bare `INT`/`REAL`/… without the program
    /// having declared it. Each entry's defining node is a synthesized terminal with no
    /// real source position — nothing ever reports a diagnostic against it, since a
    /// prelude mode can't be redeclared by user code through the same defining pass
    /// that would record a conflicting span.
    pub fn seed_standard_modes(&mut self, arena: &mut NodeArena) {
        for name in Self::STANDARD_MODES {
            let symbol = Symbol::intern(name);
            let node = arena.alloc_terminal(Attribute::Indicant, Some(symbol), Span::DUMMY, None);
            self.scopes[0].entries.insert(
                (TagKind::Indicant, symbol),
                TagEntry {
                    kind: TagKind::Indicant,
                    priority: None,
                    defining_node: node,
                    span: Span::DUMMY,
                },
            );
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::Span;

    fn dummy_entry(kind: TagKind, node: NodeId) -> TagEntry {
        TagEntry {
            kind,
            priority: None,
            defining_node: node,
            span: Span::DUMMY,
        }
    }

    fn fake_node() -> NodeId {
        let mut arena = crate::arena::NodeArena::new();
        arena.alloc_terminal(crate::attribute::Attribute::Identifier, None, Span::DUMMY, None)
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut table = SymbolTable::new();
        let outer_node = fake_node();
        let inner_node = fake_node();
        let name = Symbol::intern("vec");
        table.define(TagKind::Indicant, name, dummy_entry(TagKind::Indicant, outer_node));
        table.push_scope();
        table.define(TagKind::Indicant, name, dummy_entry(TagKind::Indicant, inner_node));
        assert_eq!(table.lookup(TagKind::Indicant, name).unwrap().defining_node, inner_node);
        table.pop_scope();
        assert_eq!(table.lookup(TagKind::Indicant, name).unwrap().defining_node, outer_node);
    }

    #[test]
    fn lookup_walks_outward_when_not_shadowed() {
        let mut table = SymbolTable::new();
        let name = Symbol::intern("x");
        let node = fake_node();
        table.define(TagKind::Identifier, name, dummy_entry(TagKind::Identifier, node));
        table.push_scope();
        assert!(table.is_declared(TagKind::Identifier, name));
    }

    #[test]
    fn undeclared_tag_is_none() {
        let table = SymbolTable::new();
        assert!(!table.is_declared(TagKind::Operator, Symbol::intern("+")));
    }
}
