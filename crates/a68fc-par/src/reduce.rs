//! Component G: bottom-up reducer.
//!
//! The core mechanism is a pattern-match rewriter (§4.G): a [`Rule`] names a target
//! attribute and a sequence of [`PatternAtom`]s; [`try_reduce`] checks whether a run of
//! siblings starting at some node matches the pattern and, if so, collapses that run
//! into one new parent node whose `sub` is the old run. [`scan_fixpoint`] repeats a
//! rule set over a sibling chain until no more rules fire, the "fix-point" steps named
//! in the spec; [`scan_once`] is the "local, single scan" variant.
//!
//! The fifteen-step order below follows §4.G's fixed dependency order. Several steps
//! are deliberately thinner than the full original grammar: format-text pictures (step
//! 6), declaration-list/bounds/argument reducers (step 12), and full struct/union/proc
//! pack recursion (part of step 1) are simplified — see DESIGN.md for what each keeps
//! and what it drops. Step 14 ("enclosed clauses") is nearly a no-op here because the
//! top-down framer already builds the final `CONDITIONAL_CLAUSE`/`CASE_CLAUSE`/
//! `LOOP_CLAUSE` shape directly (§4.E), rather than leaving that promotion for G.
//!
//! G is driven top-down over the framed tree (§2): before a range's own step order
//! runs, [`reduce_range`] walks that range's sibling chain and recurses into every
//! framed sub-range's `sub` first (a fresh range gets its own pushed symbol-table
//! scope), so a `BEGIN…END`/`(…)`/loop-part body is never left as raw tokens once its
//! enclosing range reduces. See [`reduce_nested`] for the leaf-range/structural split.

use a68fc_util::diagnostic::Handler;

use crate::arena::{NodeArena, NodeId};
use crate::attribute::{Attribute, AttributeExt};
use crate::defs::extract_definitions;
use crate::symtab::SymbolTable;

/// One position in a [`Rule`]'s pattern.
#[derive(Clone, Copy)]
pub enum PatternAtom {
    /// Matches exactly this attribute.
    Exact(Attribute),
    /// Matches any non-terminal (`WILDCARD`, per §9's decision that it does not match
    /// terminals — see [`AttributeExt::is_non_terminal`]).
    Wildcard,
    /// Matches anything except this attribute.
    Not(Attribute),
}

/// A rewrite rule: `target` is the attribute the new parent gets once `pattern`
/// matches a run of consecutive siblings.
pub struct Rule {
    pub target: Attribute,
    pub pattern: Vec<PatternAtom>,
}

impl Rule {
    fn new(target: Attribute, pattern: Vec<PatternAtom>) -> Self {
        Self { target, pattern }
    }
}

fn atom_matches(atom: PatternAtom, attr: Attribute) -> bool {
    match atom {
        PatternAtom::Exact(a) => a == attr,
        PatternAtom::Wildcard => attr.is_non_terminal(),
        PatternAtom::Not(a) => attr != a,
    }
}

/// Attempts `rule` against the run starting at `start`. On success, splices the
/// matched run under one new parent node and returns it.
pub fn try_reduce(arena: &mut NodeArena, start: NodeId, rule: &Rule) -> Option<NodeId> {
    let mut ids = Vec::with_capacity(rule.pattern.len());
    let mut cur = Some(start);
    for atom in &rule.pattern {
        let id = cur?;
        if !atom_matches(*atom, arena.attr(id)) {
            return None;
        }
        ids.push(id);
        cur = arena.next(id);
    }
    let head = ids[0];
    let tail = *ids.last().expect("pattern is non-empty");
    let before = arena.previous(head);
    let after = cur;
    let span = arena.get(head).span.merge(arena.get(tail).span);
    let parent = arena.alloc_parent(rule.target, head, span);
    arena.splice_run(head, tail, parent, before, after);
    Some(parent)
}

/// One left-to-right pass of `rules` over the chain headed by `head`. Returns the
/// (possibly new) head and whether anything matched.
fn scan_once(arena: &mut NodeArena, head: NodeId, rules: &[Rule]) -> (NodeId, bool) {
    let mut changed = false;
    let mut new_head = None;
    let mut cur = Some(head);
    while let Some(id) = cur {
        let mut matched = None;
        for rule in rules {
            if let Some(parent) = try_reduce(arena, id, rule) {
                matched = Some(parent);
                break;
            }
        }
        if let Some(parent) = matched {
            changed = true;
            if new_head.is_none() {
                new_head = Some(parent);
            }
            cur = arena.next(parent);
        } else {
            if new_head.is_none() {
                new_head = Some(id);
            }
            cur = arena.next(id);
        }
    }
    (new_head.unwrap_or(head), changed)
}

/// Repeats `rules` over the chain until a full pass makes no change.
fn scan_fixpoint(arena: &mut NodeArena, mut head: NodeId, rules: &[Rule]) -> NodeId {
    loop {
        let (new_head, changed) = scan_once(arena, head, rules);
        head = new_head;
        if !changed {
            break;
        }
    }
    head
}

/// Step 1 (partial): length-prefix chains and small declarers. Struct/union/proc pack
/// recursion into `(…)` children is not attempted here — those packs stay flat runs
/// the type checker downstream can walk directly, a simplification noted in DESIGN.md.
fn declarer_scaffolding(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let length_rules = [
        Rule::new(Attribute::Longety, vec![PatternAtom::Exact(Attribute::LongSymbol), PatternAtom::Exact(Attribute::LongSymbol)]),
        Rule::new(Attribute::Longety, vec![PatternAtom::Exact(Attribute::LongSymbol)]),
        Rule::new(Attribute::Shortety, vec![PatternAtom::Exact(Attribute::ShortSymbol), PatternAtom::Exact(Attribute::ShortSymbol)]),
        Rule::new(Attribute::Shortety, vec![PatternAtom::Exact(Attribute::ShortSymbol)]),
    ];
    let head = scan_fixpoint(arena, head, &length_rules);
    let declarer_rules = [
        Rule::new(Attribute::Declarer, vec![PatternAtom::Exact(Attribute::Longety), PatternAtom::Exact(Attribute::Indicant)]),
        Rule::new(Attribute::Declarer, vec![PatternAtom::Exact(Attribute::Shortety), PatternAtom::Exact(Attribute::Indicant)]),
        Rule::new(Attribute::Declarer, vec![PatternAtom::Exact(Attribute::Indicant)]),
    ];
    scan_fixpoint(arena, head, &declarer_rules)
}

/// Step 2: `REF declarer`, `FLEX declarer`; `PROC`/`OP` plans wrap a result declarer.
fn declarers(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let rules = [
        Rule::new(Attribute::Declarer, vec![PatternAtom::Exact(Attribute::RefSymbol), PatternAtom::Exact(Attribute::Declarer)]),
        Rule::new(Attribute::Declarer, vec![PatternAtom::Exact(Attribute::FlexSymbol), PatternAtom::Exact(Attribute::Declarer)]),
        Rule::new(Attribute::OperatorPlan, vec![PatternAtom::Exact(Attribute::ProcSymbol), PatternAtom::Exact(Attribute::Declarer)]),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Marks a `DECLARER identifier (=|:=)` or `PROC identifier (=|:=)` triple as one
/// opaque `DeclarationHead` before the primary/secondary/formula ladder runs, so the
/// defining identifier is never folded into `PRIMARY`/`TERTIARY` the way a using
/// occurrence is — only the initializer tokens that follow it are. [`declarations`],
/// run after `units`, pairs the head back up with the `UNIT` those tokens became.
fn mark_declaration_heads(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let rules = [
        Rule::new(
            Attribute::DeclarationHead,
            vec![PatternAtom::Exact(Attribute::Declarer), PatternAtom::Exact(Attribute::Identifier), PatternAtom::Exact(Attribute::EqualsSymbol)],
        ),
        Rule::new(
            Attribute::DeclarationHead,
            vec![PatternAtom::Exact(Attribute::Declarer), PatternAtom::Exact(Attribute::Identifier), PatternAtom::Exact(Attribute::BecomesSymbol)],
        ),
        Rule::new(
            Attribute::DeclarationHead,
            vec![PatternAtom::Exact(Attribute::ProcSymbol), PatternAtom::Exact(Attribute::Identifier), PatternAtom::Exact(Attribute::EqualsSymbol)],
        ),
        Rule::new(
            Attribute::DeclarationHead,
            vec![PatternAtom::Exact(Attribute::ProcSymbol), PatternAtom::Exact(Attribute::Identifier), PatternAtom::Exact(Attribute::BecomesSymbol)],
        ),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Step 4 (primary bits): denotations/`SKIP`/`NIL` become `PRIMARY`; `GOTO identifier`
/// becomes `JUMP`; a bare identifier already retagged `LABEL` by F stays as-is;
/// `identifier OF` becomes a `SELECTOR`; framed clauses wrap into `ENCLOSED_CLAUSE`. A
/// parenthesized run (`SomeClause`) is deliberately left alone here — `primaries`
/// decides whether it's a plain enclosed clause or a call/slice argument list, which
/// depends on what (if anything) immediately precedes it.
fn primary_bits(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let rules = [
        Rule::new(Attribute::Jump, vec![PatternAtom::Exact(Attribute::GotoSymbol), PatternAtom::Exact(Attribute::Identifier)]),
        Rule::new(Attribute::Selector, vec![PatternAtom::Exact(Attribute::Identifier), PatternAtom::Exact(Attribute::OfSymbol)]),
        Rule::new(Attribute::Denotation, vec![PatternAtom::Exact(Attribute::IntDenotation)]),
        Rule::new(Attribute::Denotation, vec![PatternAtom::Exact(Attribute::RealDenotation)]),
        Rule::new(Attribute::Denotation, vec![PatternAtom::Exact(Attribute::BitsDenotation)]),
        Rule::new(Attribute::Denotation, vec![PatternAtom::Exact(Attribute::StringDenotation)]),
        Rule::new(Attribute::Denotation, vec![PatternAtom::Exact(Attribute::TrueSymbol)]),
        Rule::new(Attribute::Denotation, vec![PatternAtom::Exact(Attribute::FalseSymbol)]),
        Rule::new(
            Attribute::EnclosedClause,
            vec![PatternAtom::Exact(Attribute::ClosedClause)],
        ),
        Rule::new(
            Attribute::EnclosedClause,
            vec![PatternAtom::Exact(Attribute::ConditionalClause)],
        ),
        Rule::new(Attribute::EnclosedClause, vec![PatternAtom::Exact(Attribute::CaseClause)]),
        Rule::new(Attribute::EnclosedClause, vec![PatternAtom::Exact(Attribute::LoopClause)]),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Pairs an `IDENTIFIER`/`PRIMARY` with an immediately following parenthesized run
/// (still tagged `SomeClause` — nothing upstream of `primaries` has wrapped it yet)
/// into a `SPECIFICATION`, retagging the parenthesized run itself a `GENERIC_ARGUMENT`.
/// Anything left unpaired falls through to `primaries`'s own `EnclosedClause <-
/// SomeClause` rule, the plain parenthesized-expression reading.
fn specifications(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let mut head = head;
    loop {
        let mut changed = false;
        let mut cur = Some(head);
        let mut new_head = None;
        while let Some(id) = cur {
            let is_base = matches!(arena.attr(id), Attribute::Identifier | Attribute::Primary);
            let next1 = arena.next(id);
            if is_base {
                if let Some(arg_id) = next1 {
                    if arena.attr(arg_id) == Attribute::SomeClause {
                        arena.get_mut(arg_id).attribute = Attribute::GenericArgument;
                        let before = arena.previous(id);
                        let after = arena.next(arg_id);
                        let span = arena.get(id).span.merge(arena.get(arg_id).span);
                        let parent = arena.alloc_parent(Attribute::Specification, id, span);
                        arena.splice_run(id, arg_id, parent, before, after);
                        changed = true;
                        if new_head.is_none() {
                            new_head = Some(parent);
                        }
                        cur = arena.next(parent);
                        continue;
                    }
                }
            }
            if new_head.is_none() {
                new_head = Some(id);
            }
            cur = next1;
        }
        head = new_head.unwrap_or(head);
        if !changed {
            break;
        }
    }
    head
}

/// Step 5: `SPECIFICATION` from a call/slice's `identifier (…)`/`primary (…)` shape
/// first, then `PRIMARY` from identifier/denotation/specification, and `CAST` from
/// `DECLARER ENCLOSED_CLAUSE`.
fn primaries(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let head = specifications(arena, head);
    let rules = [
        Rule::new(Attribute::Cast, vec![PatternAtom::Exact(Attribute::Declarer), PatternAtom::Exact(Attribute::EnclosedClause)]),
        Rule::new(Attribute::EnclosedClause, vec![PatternAtom::Exact(Attribute::SomeClause)]),
        Rule::new(Attribute::Primary, vec![PatternAtom::Exact(Attribute::Identifier)]),
        Rule::new(Attribute::Primary, vec![PatternAtom::Exact(Attribute::Denotation)]),
        Rule::new(Attribute::Primary, vec![PatternAtom::Exact(Attribute::EnclosedClause)]),
        Rule::new(Attribute::Primary, vec![PatternAtom::Exact(Attribute::Cast)]),
        Rule::new(Attribute::Primary, vec![PatternAtom::Exact(Attribute::Specification)]),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Step 7: selections right-to-left, generators from the qualifier F.7 already grouped.
fn secondaries(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let rules = [
        Rule::new(Attribute::Generator, vec![PatternAtom::Exact(Attribute::Qualifier), PatternAtom::Exact(Attribute::Declarer)]),
        Rule::new(Attribute::Selection, vec![PatternAtom::Exact(Attribute::Selector), PatternAtom::Exact(Attribute::Primary)]),
        Rule::new(Attribute::Selection, vec![PatternAtom::Exact(Attribute::Selector), PatternAtom::Exact(Attribute::Secondary)]),
        Rule::new(Attribute::Secondary, vec![PatternAtom::Exact(Attribute::Primary)]),
        Rule::new(Attribute::Secondary, vec![PatternAtom::Exact(Attribute::Generator)]),
        Rule::new(Attribute::Secondary, vec![PatternAtom::Exact(Attribute::Selection)]),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Step 8: monadic runs collapse right-to-left at a fixed priority (10), then dyadic
/// reduction proceeds by descending priority, matching `FORMULA OPERATOR
/// {SECONDARY|MONADIC_FORMULA|FORMULA}`. An operator with no `PRIO` entry is treated
/// as priority 0 — it still reduces, on the last pass, so one undeclared operator
/// doesn't cascade into unrelated errors, but each such use gets a warning (§9 open
/// question on priority-0 handling).
fn formulae(arena: &mut NodeArena, handler: &Handler, head: NodeId) -> NodeId {
    let monadic_rule = Rule::new(
        Attribute::MonadicFormula,
        vec![PatternAtom::Exact(Attribute::Operator), PatternAtom::Exact(Attribute::Secondary)],
    );
    let mut head = scan_fixpoint(arena, head, std::slice::from_ref(&monadic_rule));
    let monadic_on_formula = Rule::new(
        Attribute::MonadicFormula,
        vec![PatternAtom::Exact(Attribute::Operator), PatternAtom::Exact(Attribute::MonadicFormula)],
    );
    head = scan_fixpoint(arena, head, std::slice::from_ref(&monadic_on_formula));

    // Descending priority 9..=1, then a final pass at "priority 0" for any operator
    // the definitions pass never found in the `PRIO` table.
    for priority in (0..=Attribute::MAX_PRIORITY).rev() {
        loop {
            let mut changed = false;
            let mut cur = Some(head);
            let mut new_head = None;
            while let Some(id) = cur {
                let is_operand = matches!(arena.attr(id), Attribute::Secondary | Attribute::MonadicFormula | Attribute::Formula);
                let next1 = arena.next(id);
                if is_operand {
                    if let Some(op_id) = next1 {
                        let op_priority = arena.get(op_id).priority;
                        let matches_this_pass = arena.attr(op_id) == Attribute::Operator
                            && (op_priority == Some(priority) || (priority == 0 && op_priority.is_none()));
                        if matches_this_pass {
                            if let Some(rhs_id) = arena.next(op_id) {
                                if matches!(arena.attr(rhs_id), Attribute::Secondary | Attribute::MonadicFormula | Attribute::Formula) {
                                    if op_priority.is_none() {
                                        handler.warning(
                                            "operator used dyadically has no declared priority; treating as lowest priority".to_string(),
                                            arena.get(op_id).span,
                                        );
                                    }
                                    let before = arena.previous(id);
                                    let after = arena.next(rhs_id);
                                    let span = arena.get(id).span.merge(arena.get(rhs_id).span);
                                    let parent = arena.alloc_parent(Attribute::Formula, id, span);
                                    arena.splice_run(id, rhs_id, parent, before, after);
                                    changed = true;
                                    if new_head.is_none() {
                                        new_head = Some(parent);
                                    }
                                    cur = arena.next(parent);
                                    continue;
                                }
                            }
                        }
                    }
                }
                if new_head.is_none() {
                    new_head = Some(id);
                }
                cur = next1;
            }
            head = new_head.unwrap_or(head);
            if !changed {
                break;
            }
        }
    }

    head
}

/// Step 9: `NIL` alone becomes `NIHIL`; a `MONADIC_FORMULA` rolls up into `FORMULA`;
/// identity relations require tertiaries on both sides.
fn tertiaries(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let rules = [
        Rule::new(Attribute::Nihil, vec![PatternAtom::Exact(Attribute::NilSymbol)]),
        Rule::new(Attribute::Formula, vec![PatternAtom::Exact(Attribute::MonadicFormula)]),
        Rule::new(Attribute::Tertiary, vec![PatternAtom::Exact(Attribute::Formula)]),
        Rule::new(Attribute::Tertiary, vec![PatternAtom::Exact(Attribute::Secondary)]),
        Rule::new(Attribute::Tertiary, vec![PatternAtom::Exact(Attribute::Nihil)]),
        Rule::new(
            Attribute::IdentityRelation,
            vec![PatternAtom::Exact(Attribute::Tertiary), PatternAtom::Exact(Attribute::IsSymbol), PatternAtom::Exact(Attribute::Tertiary)],
        ),
        Rule::new(
            Attribute::IdentityRelation,
            vec![PatternAtom::Exact(Attribute::Tertiary), PatternAtom::Exact(Attribute::IsntSymbol), PatternAtom::Exact(Attribute::Tertiary)],
        ),
        Rule::new(
            Attribute::AndFunction,
            vec![PatternAtom::Exact(Attribute::Tertiary), PatternAtom::Exact(Attribute::AndSymbol), PatternAtom::Exact(Attribute::Tertiary)],
        ),
        Rule::new(
            Attribute::OrFunction,
            vec![PatternAtom::Exact(Attribute::Tertiary), PatternAtom::Exact(Attribute::OrSymbol), PatternAtom::Exact(Attribute::Tertiary)],
        ),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Step 10: everything that can stand alone as a statement rolls up into `UNIT`.
fn units(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let rules = [
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::IdentityRelation)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::AndFunction)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::OrFunction)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::RoutineText)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::Jump)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::SkipSymbol)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::Tertiary)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::Assertion)]),
        Rule::new(Attribute::Unit, vec![PatternAtom::Exact(Attribute::Assignation)]),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Decides which declaration a `DeclarationHead` became: its first child is either the
/// `Declarer` or the `ProcSymbol` that opened the head; its third is the defining `=`
/// or `:=` the marking pass recorded.
fn classify_declaration(arena: &NodeArena, decl_head: NodeId) -> Attribute {
    let first_child = arena.get(decl_head).sub.expect("declaration head has a declarer/PROC child");
    let second_child = arena.next(first_child).expect("declaration head has an identifier");
    let third_child = arena.next(second_child).expect("declaration head has a defining symbol");
    let is_proc = arena.attr(first_child) == Attribute::ProcSymbol;
    let is_becomes = arena.attr(third_child) == Attribute::BecomesSymbol;
    match (is_proc, is_becomes) {
        (true, _) => Attribute::ProcedureDeclaration,
        (false, true) => Attribute::VariableDeclaration,
        (false, false) => Attribute::IdentityDeclaration,
    }
}

/// Step 12 (declarations): pairs each `DeclarationHead` the earlier marking pass left
/// with the `UNIT` the ladder built from its initializer tokens, producing
/// `IDENTITY_DECLARATION`/`VARIABLE_DECLARATION`/`PROCEDURE_DECLARATION`.
fn declarations(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let mut head = head;
    loop {
        let mut changed = false;
        let mut cur = Some(head);
        let mut new_head = None;
        while let Some(id) = cur {
            let next1 = arena.next(id);
            if arena.attr(id) == Attribute::DeclarationHead {
                if let Some(unit_id) = next1 {
                    if arena.attr(unit_id) == Attribute::Unit {
                        let target = classify_declaration(arena, id);
                        let before = arena.previous(id);
                        let after = arena.next(unit_id);
                        let span = arena.get(id).span.merge(arena.get(unit_id).span);
                        let parent = arena.alloc_parent(target, id, span);
                        arena.splice_run(id, unit_id, parent, before, after);
                        changed = true;
                        if new_head.is_none() {
                            new_head = Some(parent);
                        }
                        cur = arena.next(parent);
                        continue;
                    }
                }
            }
            if new_head.is_none() {
                new_head = Some(id);
            }
            cur = next1;
        }
        head = new_head.unwrap_or(head);
        if !changed {
            break;
        }
    }
    head
}

/// Step 13 (declaration lists): each single declaration wraps into its own
/// `DeclarationList`; comma-joined declaration lists (sharing one statement position)
/// fold into one; a `DeclarationList` with nothing ahead of it rolls up into an
/// `InitialiserSeries`, the shape `serial_and_enquiry` folds against a following unit.
/// Comma-joined declarations that share a single declarer (`INT i = 1, j = 2`) are not
/// split back out here — §4.F.4's declaration pass only ever registers one identifier
/// per declarer run, a simplification DESIGN.md records alongside the other step-12
/// ones.
fn declaration_lists(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let wrap_rules = [
        Rule::new(Attribute::DeclarationList, vec![PatternAtom::Exact(Attribute::IdentityDeclaration)]),
        Rule::new(Attribute::DeclarationList, vec![PatternAtom::Exact(Attribute::VariableDeclaration)]),
        Rule::new(Attribute::DeclarationList, vec![PatternAtom::Exact(Attribute::ProcedureDeclaration)]),
    ];
    let head = scan_fixpoint(arena, head, &wrap_rules);
    let comma_fold = Rule::new(
        Attribute::DeclarationList,
        vec![PatternAtom::Exact(Attribute::DeclarationList), PatternAtom::Exact(Attribute::Comma), PatternAtom::Exact(Attribute::DeclarationList)],
    );
    let head = scan_fixpoint(arena, head, std::slice::from_ref(&comma_fold));
    let series_rule = Rule::new(Attribute::InitialiserSeries, vec![PatternAtom::Exact(Attribute::DeclarationList)]);
    scan_fixpoint(arena, head, std::slice::from_ref(&series_rule))
}

/// Step 11: assignations reduce right-to-left (`TERTIARY := UNIT`), so the rightmost
/// `:=` in a chain binds first; walk the chain from the tail inward.
fn right_to_left_constructs(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let mut stack = Vec::new();
    let mut cur = Some(head);
    while let Some(id) = cur {
        stack.push(id);
        cur = arena.next(id);
    }
    let mut changed = true;
    while changed {
        changed = false;
        for i in (0..stack.len().saturating_sub(2)).rev() {
            let (a, b, c) = (stack[i], stack[i + 1], stack[i + 2]);
            if arena.attr(a) == Attribute::Tertiary && arena.attr(b) == Attribute::BecomesSymbol && arena.attr(c) == Attribute::Unit {
                let before = arena.previous(a);
                let after = arena.next(c);
                let span = arena.get(a).span.merge(arena.get(c).span);
                let parent = arena.alloc_parent(Attribute::Assignation, a, span);
                arena.splice_run(a, c, parent, before, after);
                stack.splice(i..i + 3, [parent]);
                changed = true;
                break;
            }
        }
    }
    stack.first().copied().unwrap_or(head)
}

/// Step 13: `SEMI`-separated (and `EXIT`/`COMMA`-separated) unit chains collapse into
/// one `SERIAL_CLAUSE`; an `InitialiserSeries` (the `DECLARATION_LIST`/
/// `INITIALISER_SERIES` pair `declaration_lists` already built) ahead of the first unit
/// folds in the same way.
fn serial_and_enquiry(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let separator_rules = [
        Rule::new(Attribute::SerialClause, vec![PatternAtom::Exact(Attribute::Unit), PatternAtom::Exact(Attribute::Semicolon), PatternAtom::Wildcard]),
        Rule::new(Attribute::SerialClause, vec![PatternAtom::Exact(Attribute::SerialClause), PatternAtom::Exact(Attribute::Semicolon), PatternAtom::Wildcard]),
        Rule::new(Attribute::SerialClause, vec![PatternAtom::Exact(Attribute::InitialiserSeries), PatternAtom::Exact(Attribute::Semicolon), PatternAtom::Wildcard]),
    ];
    let mut head = scan_fixpoint(arena, head, &separator_rules);

    // A lone unit (or a declaration run with nothing following it) at the top of a
    // range is itself a (degenerate, one-statement) serial clause, so later steps
    // always see a SERIAL_CLAUSE at the range head.
    if matches!(arena.attr(head), Attribute::Unit | Attribute::InitialiserSeries) && arena.next(head).is_none() {
        let span = arena.get(head).span;
        let parent = arena.alloc_parent(Attribute::SerialClause, head, span);
        head = parent;
    }
    head
}

/// Step 15: `[LABEL] ENCLOSED_CLAUSE → PARTICULAR_PROGRAM` at the outermost range only.
pub(crate) fn particular_program(arena: &mut NodeArena, head: NodeId) -> NodeId {
    let rules = [
        Rule::new(Attribute::ParticularProgram, vec![PatternAtom::Exact(Attribute::Label), PatternAtom::Exact(Attribute::EnclosedClause)]),
        Rule::new(Attribute::ParticularProgram, vec![PatternAtom::Exact(Attribute::EnclosedClause)]),
        Rule::new(Attribute::ParticularProgram, vec![PatternAtom::Exact(Attribute::SerialClause)]),
    ];
    scan_fixpoint(arena, head, &rules)
}

/// Collects a chain's sibling ids in order, following `next` (mirrors `defs::chain`;
/// kept local since the two modules have no reason to share a dependency for a handful
/// of lines).
fn sibling_chain(arena: &NodeArena, mut cur: Option<NodeId>) -> Vec<NodeId> {
    let mut out = Vec::new();
    while let Some(id) = cur {
        out.push(id);
        cur = arena.next(id);
    }
    out
}

/// Containers whose `sub` is still a flat, unreduced token run for a fresh range — the
/// top-down framer (E) built the boundary but left the body for F/G, just as it leaves
/// a closed clause's. Format-text pictures are deliberately excluded: their body isn't
/// Algol68 expression syntax, and DESIGN.md already carries step 6's picture
/// simplification — running the expression ladder over picture tokens would only
/// manufacture spurious "unknown mode" diagnostics.
fn is_leaf_range(attr: Attribute) -> bool {
    matches!(
        attr,
        Attribute::ClosedClause
            | Attribute::SomeClause
            | Attribute::IfPart
            | Attribute::ThenPart
            | Attribute::ElsePart
            | Attribute::CasePart
            | Attribute::InPart
            | Attribute::OusePart
            | Attribute::OutPart
            | Attribute::FromPart
            | Attribute::ByPart
            | Attribute::ToPart
            | Attribute::WhilePart
            | Attribute::UntilPart
            | Attribute::AltDoPart
    )
}

/// Containers whose `sub` is already a chain of framed non-terminals the top-down
/// framer built (an `IfPart`/`ThenPart`/…, not raw tokens) — each child needs its own
/// recursive reduction, but the container itself never opens a range of its own.
fn is_structural(attr: Attribute) -> bool {
    matches!(attr, Attribute::ConditionalClause | Attribute::CaseClause | Attribute::LoopClause | Attribute::ElifPart)
}

/// Recursively reduces every framed sub-range reachable from `id`, before `id` takes
/// part in its enclosing range's own step sequence (§2's "for each sub-range, call F,
/// then reduce leaves up"; §4.G step 3, "recursively reduce each bracketed sub-range").
/// A leaf-range (`ClosedClause`, a loop/conditional/case part, …) gets its own pushed
/// symbol-table scope and the full fixed step order, exactly like the outermost range;
/// a structural container (`ConditionalClause`, `CaseClause`, `LoopClause`, `ElifPart`)
/// just dispatches into each already-framed child without opening a scope itself.
///
/// `AltDoPart`'s `sub` is a mix — the `DO` keyword leaf and do-body tokens, followed by
/// an optional nested `UntilPart` node — but it needs no special case: treating it as a
/// leaf-range runs the whole fixed step order over that chain, and this same function,
/// called again from the start of that inner `reduce_range`, recurses into the nested
/// `UntilPart` in turn before the do-body's own tokens reduce.
fn reduce_nested(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, id: NodeId) {
    let attr = arena.attr(id);
    if is_leaf_range(attr) {
        let Some(sub) = arena.get(id).sub else { return };
        symtab.push_scope();
        let new_sub = reduce_range(arena, symtab, handler, sub);
        symtab.pop_scope();
        arena.get_mut(id).sub = Some(new_sub);
    } else if is_structural(attr) {
        for child in sibling_chain(arena, arena.get(id).sub) {
            reduce_nested(arena, symtab, handler, child);
        }
    }
}

/// Drives the fixed fifteen-step order over one range's sibling chain, recursing into
/// every framed sub-range first, then running the definition extractor (F) as §4.G's
/// opening line requires ("run at the start of each range's bottom-up reduction").
pub fn reduce_range(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, head: NodeId) -> NodeId {
    for id in sibling_chain(arena, Some(head)) {
        reduce_nested(arena, symtab, handler, id);
    }
    extract_definitions(arena, symtab, handler, head);
    let head = declarer_scaffolding(arena, head);
    let head = declarers(arena, head);
    let head = mark_declaration_heads(arena, head);
    let head = primary_bits(arena, head);
    let head = primaries(arena, head);
    let head = secondaries(arena, head);
    let head = formulae(arena, handler, head);
    let head = tertiaries(arena, head);
    let head = units(arena, head);
    let head = declarations(arena, head);
    let head = declaration_lists(arena, head);
    let head = right_to_left_constructs(arena, head);
    serial_and_enquiry(arena, head)
}

/// Reduces the outermost range and wraps it as the particular program. Seeds the
/// standard-prelude scope first, so a bare `INT`/`REAL`/… mode bold tag elaborates to
/// `INDICANT` without requiring the program to write its own `MODE` declaration — §3's
/// "prelude range" sits below every range a program can open.
pub fn reduce_program(arena: &mut NodeArena, symtab: &mut SymbolTable, handler: &Handler, head: NodeId) -> NodeId {
    symtab.seed_standard_modes(arena);
    let head = reduce_range(arena, symtab, handler, head);
    particular_program(arena, head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::CompileOptions;
    use crate::framer::Framer;

    fn reduced(source: &str) -> (NodeArena, SymbolTable, NodeId) {
        let handler = Handler::new();
        let options = CompileOptions::default();
        let mut lexer = a68fc_lex::Lexer::new(source, &options, &handler);
        let mut tokens = lexer.tokenize_all();
        tokens.pop();
        let mut arena = NodeArena::new();
        let root = {
            let mut framer = Framer::new(&mut arena, &handler);
            framer.frame_program(&tokens).unwrap()
        };
        let mut symtab = SymbolTable::new();
        let root = reduce_program(&mut arena, &mut symtab, &handler, root);
        (arena, symtab, root)
    }

    #[test]
    fn simple_skip_program_reduces_to_particular_program() {
        let (arena, _symtab, root) = reduced("SKIP");
        assert_eq!(arena.attr(root), Attribute::ParticularProgram);
    }

    #[test]
    fn identity_declaration_participates_in_serial_clause() {
        let (arena, symtab, root) = reduced("INT x = 1; x");
        assert_eq!(arena.attr(root), Attribute::ParticularProgram);
        assert!(symtab.is_declared(crate::symtab::TagKind::Identifier, a68fc_util::Symbol::intern("x")));
    }

    #[test]
    fn dyadic_formula_respects_declared_priority() {
        let (arena, _symtab, root) = reduced("PRIO PLUS = 6; 1 PLUS 2");
        assert_eq!(arena.attr(root), Attribute::ParticularProgram);
    }

    #[test]
    fn variable_declaration_reduces_from_declarer_and_becomes() {
        let (arena, _symtab, root) = reduced("REF INT x := 1");
        assert_eq!(arena.attr(root), Attribute::ParticularProgram);
    }

    #[test]
    fn nested_closed_clause_body_reduces_its_own_declarations() {
        let (arena, _symtab, root) = reduced("BEGIN BEGIN INT x = 1; x END END");
        assert_eq!(arena.attr(root), Attribute::ParticularProgram);

        // The outer BEGIN...END's SERIAL_CLAUSE holds one UNIT wrapping the inner
        // ClosedClause; descend into it to reach the inner body that the recursive
        // sub-range pass is responsible for reducing before the outer range runs.
        let outer_closed = find_descendant(&arena, root, Attribute::ClosedClause).expect("outer closed clause survives reduction");
        let inner_closed = find_descendant(&arena, outer_closed, Attribute::ClosedClause).expect("inner closed clause is reachable from the outer one");
        let inner_serial = find_descendant(&arena, inner_closed, Attribute::SerialClause).expect("inner body reduced to a SERIAL_CLAUSE, not raw tokens");
        assert!(
            find_descendant(&arena, inner_serial, Attribute::IdentityDeclaration).is_some(),
            "inner BEGIN...END's `INT x = 1` reduced to an IDENTITY_DECLARATION"
        );
    }

    /// Depth-first search for the first node strictly under `id` (its `sub` chain and
    /// their descendants, never `id` itself) tagged `target` — a plain recursive walk,
    /// since the test only needs "does this attribute appear under here", not a full
    /// traversal API.
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
}
