//! Component H: error recovery.
//!
//! Called when [`crate::reduce::reduce_range`] finishes a range with more than one
//! sibling left at the top — the fixed step order ran out of rules that fire, so the
//! phrase could not be fully reduced. Rather than aborting the compile, this:
//!
//! 1. emits one diagnostic with a phrase-to-text summary, anchored at the token most
//!    likely to be the actual error site;
//! 2. synthesizes a plausible parent by mapping the leading token's attribute to a
//!    "likely" non-terminal (`IF_SYMBOL → IF_PART`, `OPEN_SYMBOL → CLOSED_CLAUSE`, …);
//! 3. splices every remaining sibling under that parent so later phases still see a
//!    tree instead of a bare list.
//!
//! This never aborts — a `RECOVERED` node with the wrong shape is always better, for a
//! front-end, than no node at all (§7's propagation policy: bottom-up syntax errors
//! recover locally and may cascade, capped by `max_errors`).

use a68fc_util::diagnostic::Handler;

use crate::arena::{NodeArena, NodeId};
use crate::attribute::Attribute;

/// Leading-token attribute to synthesized-parent attribute, most-specific guesses
/// first. Anything not covered here falls back to [`Attribute::Recovered`].
const LIKELY_PARENT: &[(Attribute, Attribute)] = &[
    (Attribute::IfSymbol, Attribute::IfPart),
    (Attribute::ElifSymbol, Attribute::ElifPart),
    (Attribute::ThenSymbol, Attribute::ThenPart),
    (Attribute::ElseSymbol, Attribute::ElsePart),
    (Attribute::CaseSymbol, Attribute::CasePart),
    (Attribute::InSymbol, Attribute::InPart),
    (Attribute::OuseSymbol, Attribute::OusePart),
    (Attribute::OutSymbol, Attribute::OutPart),
    (Attribute::ForSymbol, Attribute::ForPart),
    (Attribute::FromSymbol, Attribute::FromPart),
    (Attribute::BySymbol, Attribute::ByPart),
    (Attribute::ToSymbol, Attribute::ToPart),
    (Attribute::DownToSymbol, Attribute::ToPart),
    (Attribute::WhileSymbol, Attribute::WhilePart),
    (Attribute::DoSymbol, Attribute::AltDoPart),
    (Attribute::OpenSymbol, Attribute::SomeClause),
    (Attribute::BeginSymbol, Attribute::ClosedClause),
    (Attribute::FormatDelimSymbol, Attribute::FormatText),
];

fn likely_parent(leading: Attribute) -> Attribute {
    LIKELY_PARENT
        .iter()
        .find(|(from, _)| *from == leading)
        .map(|(_, to)| *to)
        .unwrap_or(Attribute::Recovered)
}

/// Punctuation the heuristic skips over when hunting for the "real" error token —
/// a stray `;` or `,` is rarely the thing the user actually got wrong.
fn is_trivial(attribute: Attribute) -> bool {
    matches!(attribute, Attribute::Semicolon | Attribute::Comma | Attribute::Colon)
}

/// Scans the unreduced run for the first non-trivial token, defaulting to `head`
/// itself if the whole run is punctuation.
fn likely_error_token(arena: &NodeArena, head: NodeId) -> NodeId {
    let mut cur = Some(head);
    while let Some(id) = cur {
        if !is_trivial(arena.attr(id)) {
            return id;
        }
        cur = arena.next(id);
    }
    head
}

/// Renders up to a handful of the run's leading nodes as a short "construct beginning
/// with … followed by …" phrase for the diagnostic message.
fn phrase_summary(arena: &NodeArena, head: NodeId) -> String {
    const MAX_ITEMS: usize = 6;
    let mut words = Vec::new();
    let mut cur = Some(head);
    while let Some(id) = cur {
        if words.len() >= MAX_ITEMS {
            words.push("…".to_string());
            break;
        }
        let node = arena.get(id);
        let word = node
            .symbol
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| format!("{:?}", node.attribute));
        words.push(word);
        cur = arena.next(id);
    }
    words.join(" ")
}

fn chain_tail(arena: &NodeArena, head: NodeId) -> NodeId {
    let mut tail = head;
    while let Some(next) = arena.next(tail) {
        tail = next;
    }
    tail
}

/// Recovers from a range whose reduction left more than one sibling at the top.
/// Always returns a single node — the synthesized parent — so the caller never has to
/// special-case a failed reduction downstream.
pub fn recover(arena: &mut NodeArena, handler: &Handler, head: NodeId) -> NodeId {
    let error_token = likely_error_token(arena, head);
    let summary = phrase_summary(arena, head);
    let line = arena.get(error_token).span.line;
    handler.error(
        format!("could not parse construct beginning with: {summary} (starting in line {line})"),
        arena.get(error_token).span,
    );

    let target = likely_parent(arena.attr(head));
    let tail = chain_tail(arena, head);
    let before = arena.previous(head);
    let span = arena.get(head).span.merge(arena.get(tail).span);
    let parent = arena.alloc_parent(target, head, span);
    arena.splice_run(head, tail, parent, before, None);
    parent
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::Span;

    fn leaf(arena: &mut NodeArena, attribute: Attribute) -> NodeId {
        arena.alloc_terminal(attribute, None, Span::DUMMY, None)
    }

    #[test]
    fn dangling_if_recovers_to_if_part() {
        let mut arena = NodeArena::new();
        let handler = Handler::new();
        let if_tok = leaf(&mut arena, Attribute::IfSymbol);
        let cond = leaf(&mut arena, Attribute::Identifier);
        arena.link(if_tok, cond);
        let parent = recover(&mut arena, &handler, if_tok);
        assert_eq!(arena.attr(parent), Attribute::IfPart);
        assert!(handler.has_errors());
        assert!(arena.is_symmetric());
    }

    #[test]
    fn unmapped_leader_falls_back_to_recovered() {
        let mut arena = NodeArena::new();
        let handler = Handler::new();
        let odd = leaf(&mut arena, Attribute::Comma);
        let parent = recover(&mut arena, &handler, odd);
        assert_eq!(arena.attr(parent), Attribute::Recovered);
    }

    #[test]
    fn skips_leading_semicolons_when_finding_error_token() {
        let mut arena = NodeArena::new();
        let handler = Handler::new();
        let semi = leaf(&mut arena, Attribute::Semicolon);
        let culprit = leaf(&mut arena, Attribute::EndSymbol);
        arena.link(semi, culprit);
        recover(&mut arena, &handler, semi);
        assert!(handler.has_errors());
    }
}
