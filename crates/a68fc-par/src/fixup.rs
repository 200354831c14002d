//! Component I: post-tree fixups (§4.I). Runs once, after the whole program has been
//! reduced (and, if needed, recovered).
//!
//! Four passes over the finished tree, each a plain recursive walk rather than a
//! pattern-match rewrite — by this point the tree shape is settled and these passes
//! only annotate or retag existing nodes, never splice new ones:
//!
//! 1. goto-less jump retagging
//! 2. victality check (actual/formal/virtual declarer classification)
//! 3. nest linking
//! 4. procedure-level labeling

use a68fc_util::diagnostic::Handler;
use a68fc_util::{FxHashMap, Symbol};

use crate::arena::{NodeArena, NodeId};
use crate::attribute::Attribute;

/// Collects every node in the subtree rooted at `start`'s sibling chain, recursing
/// into `sub`. Order is pre-order, left-to-right.
fn collect_all(arena: &NodeArena, start: NodeId, out: &mut Vec<NodeId>) {
    let mut cur = Some(start);
    while let Some(id) = cur {
        out.push(id);
        if let Some(sub) = arena.get(id).sub {
            collect_all(arena, sub, out);
        }
        cur = arena.next(id);
    }
}

fn is_framed_construct(attribute: Attribute) -> bool {
    matches!(
        attribute,
        Attribute::ParticularProgram
            | Attribute::ClosedClause
            | Attribute::CollateralClause
            | Attribute::ConditionalClause
            | Attribute::CaseClause
            | Attribute::LoopClause
    )
}

/// Pass 1: a `UNIT`/`TERTIARY`/`SECONDARY`/`PRIMARY` whose only leaf is an identifier
/// naming a label gets retagged `JUMP`. The label set is collected first (every
/// `LABEL`-tagged leaf left by the definition extractor, §4.F pass 5) so this never
/// needs the symbol table, which does not distinguish a label from a plain identifier
/// once both are interned under `TagKind::Identifier`.
fn retag_goto_less_jumps(arena: &mut NodeArena, nodes: &[NodeId]) {
    let mut labels: std::collections::HashSet<Symbol> = std::collections::HashSet::new();
    for &id in nodes {
        if arena.attr(id) == Attribute::Label {
            if let Some(sym) = arena.get(id).symbol {
                labels.insert(sym);
            }
        }
    }
    if labels.is_empty() {
        return;
    }
    for &id in nodes {
        if !matches!(arena.attr(id), Attribute::Unit | Attribute::Tertiary | Attribute::Secondary | Attribute::Primary) {
            continue;
        }
        let Some(sub) = arena.get(id).sub else { continue };
        if arena.next(sub).is_some() {
            continue; // not a single leaf
        }
        if arena.attr(sub) != Attribute::Identifier {
            continue;
        }
        let Some(sym) = arena.get(sub).symbol else { continue };
        if labels.contains(&sym) {
            arena.get_mut(id).attribute = Attribute::Jump;
        }
    }
}

/// Builds a child-to-parent map over the whole tree; the victality check needs to ask
/// "what is this declarer's immediate context" and nodes carry no parent pointer of
/// their own (only `nest`, which names the enclosing *framed* range, not the direct
/// parent).
fn build_parent_map(arena: &NodeArena, root: NodeId) -> FxHashMap<NodeId, NodeId> {
    let mut parents = FxHashMap::default();
    fn walk(arena: &NodeArena, start: NodeId, parents: &mut FxHashMap<NodeId, NodeId>) {
        let mut cur = Some(start);
        while let Some(id) = cur {
            if let Some(sub) = arena.get(id).sub {
                let mut child = Some(sub);
                while let Some(c) = child {
                    parents.insert(c, id);
                    child = arena.next(c);
                }
                walk(arena, sub, parents);
            }
            cur = arena.next(id);
        }
    }
    walk(arena, root, &mut parents);
    parents
}

/// Pass 2: every `DECLARER` is checked against what its immediate parent expects. A
/// generator (`LOC`/`HEAP`/`NEW` qualifier) and a cast both want an *actual* declarer;
/// everything else defaults to wanting a *formal* one. A `REF`-qualified declarer
/// (identifiable by its leftmost leaf) is *virtual*, which only an identity
/// declaration's right-hand side or a `REF` parameter may use. Mismatches diagnose —
/// per §4.I, they never abort the compile.
fn victality_check(arena: &NodeArena, handler: &Handler, parents: &FxHashMap<NodeId, NodeId>, nodes: &[NodeId]) {
    for &id in nodes {
        if arena.attr(id) != Attribute::Declarer {
            continue;
        }
        let leaves = arena.leaves(id);
        let is_virtual = leaves.first().map(|l| arena.attr(*l) == Attribute::RefSymbol).unwrap_or(false);
        let parent_attr = parents.get(&id).map(|p| arena.attr(*p));
        let wants_actual = matches!(parent_attr, Some(Attribute::Generator) | Some(Attribute::Cast));
        if wants_actual && is_virtual {
            handler.warning(
                "declarer is REF-qualified (virtual) where an actual mode is expected here".to_string(),
                arena.get(id).span,
            );
        }
    }
}

/// Pass 3: every node's `nest` points to the nearest enclosing framed construct.
fn link_nest(arena: &mut NodeArena, start: NodeId, current: Option<NodeId>) {
    let mut cur = Some(start);
    while let Some(id) = cur {
        arena.get_mut(id).nest = current;
        let inner = if is_framed_construct(arena.attr(id)) { Some(id) } else { current };
        if let Some(sub) = arena.get(id).sub {
            link_nest(arena, sub, inner);
        }
        cur = arena.next(id);
    }
}

/// Pass 4: every node under a `ROUTINE_TEXT` gets that routine's nesting depth
/// stamped onto `procedure_level`, one more than whatever depth the routine itself
/// sits at.
fn label_procedure_levels(arena: &mut NodeArena, start: NodeId, depth: u32) {
    let mut cur = Some(start);
    while let Some(id) = cur {
        arena.get_mut(id).procedure_level = depth;
        let inner = if arena.attr(id) == Attribute::RoutineText { depth + 1 } else { depth };
        if let Some(sub) = arena.get(id).sub {
            label_procedure_levels(arena, sub, inner);
        }
        cur = arena.next(id);
    }
}

/// Runs all four fixup passes over the finished program tree.
pub fn fixup_program(arena: &mut NodeArena, handler: &Handler, root: NodeId) {
    let mut nodes = Vec::new();
    collect_all(arena, root, &mut nodes);

    retag_goto_less_jumps(arena, &nodes);

    let parents = build_parent_map(arena, root);
    victality_check(arena, handler, &parents, &nodes);

    link_nest(arena, root, None);
    label_procedure_levels(arena, root, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::Span;

    fn leaf(arena: &mut NodeArena, attribute: Attribute, symbol: Option<Symbol>) -> NodeId {
        arena.alloc_terminal(attribute, symbol, Span::DUMMY, None)
    }

    #[test]
    fn identifier_naming_a_label_becomes_jump() {
        let mut arena = NodeArena::new();
        let handler = Handler::new();
        let name = Symbol::intern("again");
        let label = leaf(&mut arena, Attribute::Label, Some(name));
        let body = leaf(&mut arena, Attribute::SkipSymbol, None);
        arena.link(label, body);
        let serial = arena.alloc_parent(Attribute::SerialClause, label, Span::DUMMY);

        let use_leaf = leaf(&mut arena, Attribute::Identifier, Some(name));
        let unit = arena.alloc_parent(Attribute::Unit, use_leaf, Span::DUMMY);
        arena.link(serial, unit);

        fixup_program(&mut arena, &handler, serial);
        assert_eq!(arena.attr(unit), Attribute::Jump);
    }

    #[test]
    fn ref_declarer_under_generator_is_not_flagged() {
        let mut arena = NodeArena::new();
        let handler = Handler::new();
        let ref_leaf = leaf(&mut arena, Attribute::RefSymbol, None);
        let mode_leaf = leaf(&mut arena, Attribute::Indicant, Some(Symbol::intern("INT")));
        arena.link(ref_leaf, mode_leaf);
        let declarer = arena.alloc_parent(Attribute::Declarer, ref_leaf, Span::DUMMY);
        fixup_program(&mut arena, &handler, declarer);
        assert!(!handler.has_errors());
    }

    #[test]
    fn nest_points_to_nearest_framed_construct() {
        let mut arena = NodeArena::new();
        let handler = Handler::new();
        let inner = leaf(&mut arena, Attribute::SkipSymbol, None);
        let closed = arena.alloc_parent(Attribute::ClosedClause, inner, Span::DUMMY);
        fixup_program(&mut arena, &handler, closed);
        assert_eq!(arena.get(inner).nest, Some(closed));
        assert_eq!(arena.get(closed).nest, None);
    }
}
