//! Component F: definition extractor.
//!
//! Run once per range (closed-clause body) before that range's bottom-up reduction
//! (§4.F). Works over the flat sibling list the framer produced for the range, in eight
//! passes: indicants, priorities, operators, identities/variables/procedures, labels,
//! bold-tag elaboration, qualifier grouping, and operator-priority propagation. Passes
//! run in this fixed order because later passes depend on the symbol table entries
//! earlier ones install — bold-tag elaboration (pass 6) cannot tell an `INDICANT` from
//! an `OPERATOR` until passes 1–3 have populated the table.

use a68fc_util::diagnostic::Handler;
use a68fc_util::Symbol;

use crate::arena::{NodeArena, NodeId};
use crate::attribute::Attribute;
use crate::symtab::{SymbolTable, TagEntry, TagKind};

/// Collects a range's sibling ids in order, following `next`.
fn chain(arena: &NodeArena, mut cur: Option<NodeId>) -> Vec<NodeId> {
    let mut out = Vec::new();
    while let Some(id) = cur {
        out.push(id);
        cur = arena.next(id);
    }
    out
}

/// Skips over a declarer starting at `nodes[i]`, returning the index just past it.
/// Understands the bracket/qualifier vocabulary named in §4.F.1; anything else is
/// treated as a single-token declarer (an `INDICANT` reference or a bare mode bold tag).
fn skip_declarer(arena: &NodeArena, nodes: &[NodeId], mut i: usize) -> usize {
    while i < nodes.len() {
        match arena.attr(nodes[i]) {
            Attribute::RefSymbol | Attribute::FlexSymbol | Attribute::LongSymbol | Attribute::ShortSymbol => {
                i += 1;
            }
            Attribute::StructSymbol | Attribute::UnionSymbol | Attribute::ProcSymbol => {
                i += 1;
                if i < nodes.len() && arena.attr(nodes[i]) == Attribute::OpenSymbol {
                    i += 1;
                    let mut depth = 1;
                    while i < nodes.len() && depth > 0 {
                        match arena.attr(nodes[i]) {
                            Attribute::OpenSymbol => depth += 1,
                            Attribute::CloseSymbol => depth -= 1,
                            _ => {}
                        }
                        i += 1;
                    }
                }
            }
            Attribute::BoldTag | Attribute::Indicant => {
                i += 1;
                break;
            }
            _ => break,
        }
    }
    i
}

/// Pass 1: `MODE A = declarer, B = declarer, …`.
fn extract_indicants(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, nodes: &[NodeId]) {
    let mut i = 0;
    while i < nodes.len() {
        if arena.attr(nodes[i]) != Attribute::ModeSymbol {
            i += 1;
            continue;
        }
        i += 1;
        loop {
            if i >= nodes.len() || arena.attr(nodes[i]) != Attribute::BoldTag {
                break;
            }
            let defining = nodes[i];
            let name = arena.get(defining).symbol;
            i += 1;
            if i < nodes.len() && arena.attr(nodes[i]) == Attribute::EqualsSymbol {
                arena.get_mut(nodes[i]).attribute = Attribute::AltEqualsSymbol;
                i += 1;
            }
            i = skip_declarer(arena, nodes, i);
            if let Some(name) = name {
                arena.get_mut(defining).attribute = Attribute::DefiningIndicant;
                let prior = symtab.define(
                    TagKind::Indicant,
                    name,
                    TagEntry {
                        kind: TagKind::Indicant,
                        priority: None,
                        defining_node: defining,
                        span: arena.get(defining).span,
                    },
                );
                if prior.is_some() {
                    handler.warning(
                        format!("mode '{}' redefined in this range", name.as_str()),
                        arena.get(defining).span,
                    );
                }
            }
            if i < nodes.len() && arena.attr(nodes[i]) == Attribute::Comma {
                i += 1;
                continue;
            }
            break;
        }
    }
}

/// An operator spelling that itself ends in `=` (e.g. `+=:`) must be split so the
/// defining `=` isn't swallowed into the spelling; the scanner never produces this
/// split on its own since `=` is a normal MONAD character.
fn split_trailing_equals(name: &str) -> (&str, bool) {
    if name.len() > 1 && name.ends_with('=') {
        (&name[..name.len() - 1], true)
    } else {
        (name, false)
    }
}

/// Pass 2: `PRIO ⊕ = k`.
fn extract_priorities(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, nodes: &[NodeId]) {
    let mut i = 0;
    while i < nodes.len() {
        if arena.attr(nodes[i]) != Attribute::PrioSymbol {
            i += 1;
            continue;
        }
        i += 1;
        if i >= nodes.len() || arena.attr(nodes[i]) != Attribute::Operator && arena.attr(nodes[i]) != Attribute::BoldTag {
            continue;
        }
        let op_node = nodes[i];
        let raw = arena.get(op_node).symbol.map(|s| s.as_str().to_string()).unwrap_or_default();
        let (spelling, split) = split_trailing_equals(&raw);
        let name = Symbol::intern(spelling);
        i += 1;
        if split {
            // the trailing `=` we peeled off is the defining one; no separate token to skip.
        } else if i < nodes.len() && arena.attr(nodes[i]) == Attribute::EqualsSymbol {
            i += 1;
        }
        let priority = if i < nodes.len() && arena.attr(nodes[i]) == Attribute::IntDenotation {
            let text = arena.get(nodes[i]).symbol.map(|s| s.as_str().to_string()).unwrap_or_default();
            i += 1;
            match text.parse::<u8>() {
                Ok(p) if (1..=Attribute::MAX_PRIORITY).contains(&p) => p,
                Ok(_) => {
                    handler.error(format!("priority for '{}' out of range 1..9", name.as_str()), arena.get(op_node).span);
                    Attribute::MAX_PRIORITY
                }
                Err(_) => {
                    handler.error(format!("priority for '{}' is not an integer", name.as_str()), arena.get(op_node).span);
                    Attribute::MAX_PRIORITY
                }
            }
        } else {
            handler.error(format!("PRIO {} is missing a priority value", name.as_str()), arena.get(op_node).span);
            Attribute::MAX_PRIORITY
        };
        symtab.define(
            TagKind::Priority,
            name,
            TagEntry {
                kind: TagKind::Priority,
                priority: Some(priority),
                defining_node: op_node,
                span: arena.get(op_node).span,
            },
        );
    }
}

/// Pass 3: `OP [(formals)] ⊕ = routine-text`.
fn extract_operators(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, nodes: &[NodeId]) {
    let mut i = 0;
    while i < nodes.len() {
        if arena.attr(nodes[i]) != Attribute::OpSymbol {
            i += 1;
            continue;
        }
        i += 1;
        if i < nodes.len() && arena.attr(nodes[i]) == Attribute::OpenSymbol {
            i += 1;
            let mut depth = 1;
            while i < nodes.len() && depth > 0 {
                match arena.attr(nodes[i]) {
                    Attribute::OpenSymbol => depth += 1,
                    Attribute::CloseSymbol => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
        }
        if i >= nodes.len() {
            continue;
        }
        let op_node = nodes[i];
        let raw = arena.get(op_node).symbol.map(|s| s.as_str().to_string()).unwrap_or_default();
        if raw.is_empty() {
            i += 1;
            continue;
        }
        let (spelling, split) = split_trailing_equals(&raw);
        let name = Symbol::intern(spelling);
        i += 1;
        if split {
            // already consumed the defining `=` as part of the spelling.
        } else if i < nodes.len() && arena.attr(nodes[i]) == Attribute::EqualsSymbol {
            arena.get_mut(nodes[i]).attribute = Attribute::AltEqualsSymbol;
            i += 1;
        } else {
            handler.warning(format!("OP {} declaration missing '='", name.as_str()), arena.get(op_node).span);
        }
        arena.get_mut(op_node).attribute = Attribute::Operator;
        symtab.define(
            TagKind::Operator,
            name,
            TagEntry {
                kind: TagKind::Operator,
                priority: None,
                defining_node: op_node,
                span: arena.get(op_node).span,
            },
        );
    }
}

/// Pass 4: identity/variable/procedure declarations. Recognizes `declarer id = unit`,
/// `declarer id := unit`, and `PROC id (= | :=) routine-text`; a mismatched defining
/// symbol (`=` where `:=` was intended or vice versa) is accepted with a diagnostic,
/// per §4.F.4's "accept common errors" note.
fn extract_identities(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, nodes: &[NodeId]) {
    let mut i = 0;
    while i < nodes.len() {
        let starts_proc = arena.attr(nodes[i]) == Attribute::ProcSymbol; // PROC id = routine-text
        let looks_like_declarer = matches!(
            arena.attr(nodes[i]),
            Attribute::BoldTag | Attribute::Indicant | Attribute::RefSymbol | Attribute::FlexSymbol | Attribute::LongSymbol | Attribute::ShortSymbol
        );
        if !starts_proc && !looks_like_declarer {
            i += 1;
            continue;
        }
        let decl_start = i;
        if starts_proc {
            i += 1;
        } else {
            i = skip_declarer(arena, nodes, i);
        }
        if i >= nodes.len() || arena.attr(nodes[i]) != Attribute::Identifier {
            i = decl_start + 1;
            continue;
        }
        let defining = nodes[i];
        let name = arena.get(defining).symbol;
        i += 1;
        // Variable vs. identity is recorded by the declaration node the reducer builds
        // (G.12); this pass only needs to consume the defining symbol and register the name.
        match nodes.get(i).map(|n| arena.attr(*n)) {
            Some(Attribute::EqualsSymbol) | Some(Attribute::BecomesSymbol) => i += 1,
            _ => handler.warning(
                format!("declaration of '{}' missing '=' or ':='", name.map(|s| s.as_str().to_string()).unwrap_or_default()),
                arena.get(defining).span,
            ),
        };
        if let Some(name) = name {
            arena.get_mut(defining).attribute = Attribute::Identifier;
            let prior = symtab.define(
                TagKind::Identifier,
                name,
                TagEntry {
                    kind: TagKind::Identifier,
                    priority: None,
                    defining_node: defining,
                    span: arena.get(defining).span,
                },
            );
            if prior.is_some() {
                handler.warning(format!("'{}' redeclared in this range", name.as_str()), arena.get(defining).span);
            }
        }
    }
}

/// Pass 5: `identifier :` inside a serial/enquiry clause introduces a defining label.
fn extract_labels(arena: &mut NodeArena, symtab: &mut SymbolTable, nodes: &[NodeId]) {
    for w in nodes.windows(2) {
        let (id, colon) = (w[0], w[1]);
        if arena.attr(id) == Attribute::Identifier && arena.attr(colon) == Attribute::Colon {
            if let Some(name) = arena.get(id).symbol {
                arena.get_mut(id).attribute = Attribute::Label;
                symtab.define(
                    TagKind::Identifier,
                    name,
                    TagEntry {
                        kind: TagKind::Identifier,
                        priority: None,
                        defining_node: id,
                        span: arena.get(id).span,
                    },
                );
            }
        }
    }
}

/// Pass 6: every remaining `BOLD_TAG` is either a mode reference (`INDICANT`) or an
/// operator reference (`OPERATOR`), resolved by table lookup.
fn elaborate_bold_tags(arena: &mut NodeArena, symtab: &SymbolTable, handler: &Handler, nodes: &[NodeId]) {
    for &id in nodes {
        if arena.attr(id) != Attribute::BoldTag {
            continue;
        }
        let Some(name) = arena.get(id).symbol else { continue };
        if symtab.is_declared(TagKind::Indicant, name) {
            arena.get_mut(id).attribute = Attribute::Indicant;
        } else if symtab.is_declared(TagKind::Operator, name) {
            arena.get_mut(id).attribute = Attribute::Operator;
        } else {
            handler.error(format!("'{}' is neither a known mode nor operator", name.as_str()), arena.get(id).span);
        }
    }
}

/// Pass 7: `LOC`/`HEAP`/`NEW` preceding a declarer or `PROC` are grouped under a
/// `QUALIFIER` parent so the generator pass (G.2) can recognize them as one unit.
fn group_qualifiers(arena: &mut NodeArena, nodes: &[NodeId]) {
    for &id in nodes {
        if matches!(arena.attr(id), Attribute::LocSymbol | Attribute::HeapSymbol | Attribute::NewSymbol) {
            let span = arena.get(id).span;
            let parent = arena.alloc_parent(Attribute::Qualifier, id, span);
            if let Some(prev) = arena.previous(id) {
                arena.get_mut(prev).next = Some(parent);
                arena.get_mut(parent).previous = Some(prev);
            }
            if let Some(next) = arena.next(id) {
                arena.get_mut(parent).next = Some(next);
                arena.get_mut(next).previous = Some(parent);
            }
        }
    }
}

/// Pass 8: every `OPERATOR` occurrence (not just defining ones) receives its dyadic
/// priority from the table; an occurrence the table has no priority for is monadic
/// (priority 0, resolved to `MONADIC_PRIORITY` by the formula pass in G.8).
fn propagate_priorities(arena: &mut NodeArena, symtab: &SymbolTable, nodes: &[NodeId]) {
    for &id in nodes {
        if arena.attr(id) != Attribute::Operator {
            continue;
        }
        let Some(name) = arena.get(id).symbol else { continue };
        if let Some(entry) = symtab.lookup(TagKind::Priority, name) {
            arena.get_mut(id).priority = entry.priority;
        }
    }
}

/// Runs all eight passes over the sibling run headed by `head`.
pub fn extract_definitions(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, head: NodeId) {
    let nodes = chain(arena, Some(head));
    extract_indicants(arena, symtab, handler, &nodes);
    extract_priorities(arena, symtab, handler, &nodes);
    extract_operators(arena, symtab, handler, &nodes);
    extract_identities(arena, symtab, handler, &nodes);
    extract_labels(arena, symtab, &nodes);
    elaborate_bold_tags(arena, symtab, handler, &nodes);
    group_qualifiers(arena, &nodes);
    propagate_priorities(arena, symtab, &nodes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::{CompileOptions, Span};

    fn framed_chain(source: &str) -> (NodeArena, NodeId) {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = a68fc_lex::Lexer::new(source, &options, &handler);
        let mut tokens = lexer.tokenize_all();
        tokens.pop();
        let mut arena = NodeArena::new();
        let mut pos = 0;
        let mut ids = Vec::new();
        while pos < tokens.len() {
            let t = tokens[pos];
            ids.push(arena.alloc_terminal(t.attribute, t.symbol, t.span, t.priority));
            pos += 1;
        }
        for w in ids.windows(2) {
            arena.link(w[0], w[1]);
        }
        (arena, ids[0])
    }

    #[test]
    fn mode_declaration_enters_indicant_and_retags_defining_tag() {
        let (mut arena, head) = framed_chain("MODE VEC = INT");
        let mut symtab = SymbolTable::new();
        let handler = Handler::new();
        extract_definitions(&mut arena, &mut symtab, &handler, head);
        let name = Symbol::intern("VEC");
        assert!(symtab.is_declared(TagKind::Indicant, name));
    }

    #[test]
    fn prio_declaration_sets_priority() {
        let (mut arena, head) = framed_chain("PRIO MAX = 9");
        let mut symtab = SymbolTable::new();
        let handler = Handler::new();
        extract_definitions(&mut arena, &mut symtab, &handler, head);
        let entry = symtab.lookup(TagKind::Priority, Symbol::intern("MAX")).unwrap();
        assert_eq!(entry.priority, Some(9));
    }

    #[test]
    fn identity_declaration_enters_identifier() {
        let (mut arena, head) = framed_chain("INT x = 1");
        let mut symtab = SymbolTable::new();
        let handler = Handler::new();
        extract_definitions(&mut arena, &mut symtab, &handler, head);
        assert!(symtab.is_declared(TagKind::Identifier, Symbol::intern("x")));
    }

    #[test]
    fn label_before_unit_is_recognized() {
        let (mut arena, head) = framed_chain("loop : SKIP");
        let mut symtab = SymbolTable::new();
        let handler = Handler::new();
        extract_definitions(&mut arena, &mut symtab, &handler, head);
        assert!(symtab.is_declared(TagKind::Identifier, Symbol::intern("loop")));
        assert_eq!(arena.attr(head), Attribute::Label);
    }

    #[test]
    fn unknown_bold_tag_is_diagnosed() {
        let (mut arena, head) = framed_chain("MYSTERIOUSMODE x");
        let mut symtab = SymbolTable::new();
        let handler = Handler::new();
        extract_definitions(&mut arena, &mut symtab, &handler, head);
        assert!(handler.has_errors());
    }

    #[test]
    fn span_dummy_is_available_for_manual_nodes() {
        assert_eq!(Span::DUMMY.line, 0);
    }
}
