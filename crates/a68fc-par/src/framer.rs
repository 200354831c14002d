//! Component E: top-down framer.
//!
//! Structured recursive descent over the flat, bracket-checked token stream, driven by
//! keywords: `BEGIN…END`, `(…)`, `IF…THEN…[ELIF…]*[ELSE…]FI`, `CASE…IN…[OUSE…]*[OUT…]
//! ESAC`, the `FOR/FROM/BY/TO/DOWNTO/WHILE/DO…[UNTIL…]OD` loop family, and `$…$` format
//! texts each become a sub-tree keyed by their opener. This does not reduce anything —
//! declarers, formulae, and the rest of the grammar are still flat token runs inside
//! each framed part, left for the definition extractor and bottom-up reducer (F, G) to
//! work over once a range's boundaries are explicit.
//!
//! A `DO` that introduces a loop's repeat body has its attribute rewritten to
//! `ALT_DO_PART`'s leading token... in practice this crate tags the *part*, not the
//! leaf, as `AltDoPart` rather than mutating the scanned `DoSymbol` leaf itself, since
//! the leaf's original attribute is still meaningful to error messages that quote the
//! source token.

use a68fc_util::diagnostic::Handler;
use a68fc_util::Span;

use a68fc_lex::Token;

use crate::arena::{NodeArena, NodeId};
use crate::attribute::Attribute;

/// Keywords that terminate the current clause body when framing stops early because
/// an expected closer was never found (so the caller doesn't run off the end of an
/// enclosing construct too).
const PART_BOUNDARIES: &[Attribute] = &[
    Attribute::ThenSymbol,
    Attribute::ElifSymbol,
    Attribute::ElseSymbol,
    Attribute::FiSymbol,
    Attribute::InSymbol,
    Attribute::OuseSymbol,
    Attribute::OutSymbol,
    Attribute::EsacSymbol,
    Attribute::FromSymbol,
    Attribute::BySymbol,
    Attribute::ToSymbol,
    Attribute::DownToSymbol,
    Attribute::WhileSymbol,
    Attribute::DoSymbol,
    Attribute::UntilSymbol,
    Attribute::OdSymbol,
    Attribute::EndSymbol,
    Attribute::CloseSymbol,
];

pub struct Framer<'a> {
    arena: &'a mut NodeArena,
    handler: &'a Handler,
}

impl<'a> Framer<'a> {
    pub fn new(arena: &'a mut NodeArena, handler: &'a Handler) -> Self {
        Self { arena, handler }
    }

    /// Frames the whole program: the root-level sibling list (no implicit enclosing
    /// bracket — a particular program is just a serial clause at top level).
    pub fn frame_program(&mut self, tokens: &[Token]) -> Option<NodeId> {
        let mut pos = 0;
        let ids = self.frame_until(tokens, &mut pos, &[]);
        self.link_chain(&ids);
        ids.first().copied()
    }

    fn peek(&self, tokens: &[Token], pos: usize) -> Option<Attribute> {
        tokens.get(pos).map(|t| t.attribute)
    }

    fn frame_leaf(&mut self, tokens: &[Token], pos: &mut usize) -> NodeId {
        let tok = tokens[*pos];
        *pos += 1;
        self.arena.alloc_terminal(tok.attribute, tok.symbol, tok.span, tok.priority)
    }

    fn expect(&mut self, tokens: &[Token], pos: &mut usize, expected: Attribute, name: &str, open_span: Span) -> Option<NodeId> {
        if self.peek(tokens, *pos) == Some(expected) {
            Some(self.frame_leaf(tokens, pos))
        } else {
            self.handler.error(format!("expected '{}' to close construct opened here", name), open_span);
            None
        }
    }

    fn frame_until(&mut self, tokens: &[Token], pos: &mut usize, stop: &[Attribute]) -> Vec<NodeId> {
        let mut out = Vec::new();
        while let Some(attr) = self.peek(tokens, *pos) {
            if stop.contains(&attr) {
                break;
            }
            let id = match attr {
                Attribute::BeginSymbol => self.frame_bracket(tokens, pos, Attribute::EndSymbol, "END", Attribute::ClosedClause),
                Attribute::OpenSymbol => self.frame_bracket(tokens, pos, Attribute::CloseSymbol, ")", Attribute::SomeClause),
                Attribute::FormatDelimSymbol => self.frame_format(tokens, pos),
                Attribute::IfSymbol => self.frame_conditional(tokens, pos),
                Attribute::CaseSymbol => self.frame_case(tokens, pos),
                Attribute::ForSymbol
                | Attribute::FromSymbol
                | Attribute::BySymbol
                | Attribute::ToSymbol
                | Attribute::DownToSymbol
                | Attribute::WhileSymbol
                | Attribute::DoSymbol => self.frame_loop(tokens, pos),
                _ => self.frame_leaf(tokens, pos),
            };
            out.push(id);
        }
        out
    }

    fn link_chain(&mut self, ids: &[NodeId]) {
        for pair in ids.windows(2) {
            self.arena.link(pair[0], pair[1]);
        }
    }

    fn wrap_list(&mut self, attribute: Attribute, mut children: Vec<NodeId>, span: Span) -> NodeId {
        if children.is_empty() {
            let skip = self.arena.alloc_terminal(Attribute::SkipSymbol, None, span, None);
            children.push(skip);
        }
        self.link_chain(&children);
        let head = children[0];
        self.arena.alloc_parent(attribute, head, span)
    }

    fn frame_bracket(
        &mut self,
        tokens: &[Token],
        pos: &mut usize,
        close: Attribute,
        close_name: &str,
        target: Attribute,
    ) -> NodeId {
        let open_span = tokens[*pos].span;
        *pos += 1; // opener itself is not kept as a child; it is implied by `target`
        let children = self.frame_until(tokens, pos, &[close]);
        let end_span = self.expect(tokens, pos, close, close_name, open_span).map_or(open_span, |id| self.arena.get(id).span);
        self.wrap_list(target, children, open_span.merge(end_span))
    }

    fn frame_format(&mut self, tokens: &[Token], pos: &mut usize) -> NodeId {
        let open = self.frame_leaf(tokens, pos); // opening $
        let children = self.frame_until(tokens, pos, &[Attribute::FormatDelimSymbol]);
        let close_span = if self.peek(tokens, *pos) == Some(Attribute::FormatDelimSymbol) {
            let id = self.frame_leaf(tokens, pos);
            self.arena.get(id).span
        } else {
            self.handler.error("format text missing closing '$'".to_string(), self.arena.get(open).span);
            self.arena.get(open).span
        };
        let mut kids = vec![open];
        kids.extend(children);
        let span = self.arena.get(open).span.merge(close_span);
        self.wrap_list(Attribute::FormatText, kids, span)
    }

    fn frame_conditional(&mut self, tokens: &[Token], pos: &mut usize) -> NodeId {
        let if_span = tokens[*pos].span;
        let if_leaf = self.frame_leaf(tokens, pos);
        let cond = self.frame_until(tokens, pos, &[Attribute::ThenSymbol, Attribute::FiSymbol]);
        let mut if_part_kids = vec![if_leaf];
        if_part_kids.extend(cond);
        let if_part = self.wrap_list(Attribute::IfPart, if_part_kids, if_span);

        let mut clause_children = vec![if_part];

        if self.peek(tokens, *pos) == Some(Attribute::ThenSymbol) {
            clause_children.push(self.frame_then_part(tokens, pos));
        } else {
            self.handler.error("IF without THEN".to_string(), if_span);
        }

        while self.peek(tokens, *pos) == Some(Attribute::ElifSymbol) {
            clause_children.push(self.frame_elif_part(tokens, pos));
        }

        if self.peek(tokens, *pos) == Some(Attribute::ElseSymbol) {
            let else_span = tokens[*pos].span;
            let else_leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(tokens, pos, &[Attribute::FiSymbol]);
            let mut kids = vec![else_leaf];
            kids.extend(body);
            clause_children.push(self.wrap_list(Attribute::ElsePart, kids, else_span));
        }

        self.expect(tokens, pos, Attribute::FiSymbol, "FI", if_span);
        self.wrap_list(Attribute::ConditionalClause, clause_children, if_span)
    }

    fn frame_then_part(&mut self, tokens: &[Token], pos: &mut usize) -> NodeId {
        let span = tokens[*pos].span;
        let leaf = self.frame_leaf(tokens, pos);
        let body = self.frame_until(
            tokens,
            pos,
            &[Attribute::ElifSymbol, Attribute::ElseSymbol, Attribute::FiSymbol],
        );
        let mut kids = vec![leaf];
        kids.extend(body);
        self.wrap_list(Attribute::ThenPart, kids, span)
    }

    /// An `ELIF` behaves like a nested `IF` for framing purposes: `ElifPart(IfPart,
    /// ThenPart)`, matching the seed scenario's nesting shape (§8).
    fn frame_elif_part(&mut self, tokens: &[Token], pos: &mut usize) -> NodeId {
        let span = tokens[*pos].span;
        let elif_leaf = self.frame_leaf(tokens, pos);
        let cond = self.frame_until(tokens, pos, &[Attribute::ThenSymbol, Attribute::FiSymbol]);
        let mut if_part_kids = vec![elif_leaf];
        if_part_kids.extend(cond);
        let inner_if_part = self.wrap_list(Attribute::IfPart, if_part_kids, span);

        let mut kids = vec![inner_if_part];
        if self.peek(tokens, *pos) == Some(Attribute::ThenSymbol) {
            kids.push(self.frame_then_part(tokens, pos));
        }
        self.wrap_list(Attribute::ElifPart, kids, span)
    }

    fn frame_case(&mut self, tokens: &[Token], pos: &mut usize) -> NodeId {
        let case_span = tokens[*pos].span;
        let case_leaf = self.frame_leaf(tokens, pos);
        let enquiry = self.frame_until(tokens, pos, &[Attribute::InSymbol, Attribute::EsacSymbol]);
        let mut case_part_kids = vec![case_leaf];
        case_part_kids.extend(enquiry);
        let case_part = self.wrap_list(Attribute::CasePart, case_part_kids, case_span);

        let mut clause_children = vec![case_part];

        if self.peek(tokens, *pos) == Some(Attribute::InSymbol) {
            let in_span = tokens[*pos].span;
            let in_leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(
                tokens,
                pos,
                &[Attribute::OuseSymbol, Attribute::OutSymbol, Attribute::EsacSymbol],
            );
            let mut kids = vec![in_leaf];
            kids.extend(body);
            clause_children.push(self.wrap_list(Attribute::InPart, kids, in_span));
        } else {
            self.handler.error("CASE without IN".to_string(), case_span);
        }

        while self.peek(tokens, *pos) == Some(Attribute::OuseSymbol) {
            let ouse_span = tokens[*pos].span;
            let ouse_leaf = self.frame_leaf(tokens, pos);
            let enquiry = self.frame_until(tokens, pos, &[Attribute::InSymbol, Attribute::EsacSymbol]);
            let mut kids = vec![ouse_leaf];
            kids.extend(enquiry);
            if self.peek(tokens, *pos) == Some(Attribute::InSymbol) {
                let in_leaf = self.frame_leaf(tokens, pos);
                kids.push(in_leaf);
                let body = self.frame_until(
                    tokens,
                    pos,
                    &[Attribute::OuseSymbol, Attribute::OutSymbol, Attribute::EsacSymbol],
                );
                kids.extend(body);
            }
            clause_children.push(self.wrap_list(Attribute::OusePart, kids, ouse_span));
        }

        if self.peek(tokens, *pos) == Some(Attribute::OutSymbol) {
            let out_span = tokens[*pos].span;
            let out_leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(tokens, pos, &[Attribute::EsacSymbol]);
            let mut kids = vec![out_leaf];
            kids.extend(body);
            clause_children.push(self.wrap_list(Attribute::OutPart, kids, out_span));
        }

        self.expect(tokens, pos, Attribute::EsacSymbol, "ESAC", case_span);
        self.wrap_list(Attribute::CaseClause, clause_children, case_span)
    }

    /// Rebrackets the `FOR/FROM/BY/TO/DOWNTO/WHILE/DO…[UNTIL]…OD` loop family into a
    /// `LoopClause` whose parts are present only when the corresponding keyword was
    /// (§4.E: "missing parts represented by absence, not by padding").
    fn frame_loop(&mut self, tokens: &[Token], pos: &mut usize) -> NodeId {
        let loop_span = tokens[*pos].span;
        let mut children = Vec::new();

        if self.peek(tokens, *pos) == Some(Attribute::ForSymbol) {
            let span = tokens[*pos].span;
            let for_leaf = self.frame_leaf(tokens, pos);
            let mut kids = vec![for_leaf];
            if self.peek(tokens, *pos) == Some(Attribute::Identifier) {
                kids.push(self.frame_leaf(tokens, pos));
            }
            children.push(self.wrap_list(Attribute::ForPart, kids, span));
        }

        if matches!(self.peek(tokens, *pos), Some(Attribute::FromSymbol)) {
            let span = tokens[*pos].span;
            let leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(
                tokens,
                pos,
                &[Attribute::BySymbol, Attribute::ToSymbol, Attribute::DownToSymbol, Attribute::WhileSymbol, Attribute::DoSymbol],
            );
            let mut kids = vec![leaf];
            kids.extend(body);
            children.push(self.wrap_list(Attribute::FromPart, kids, span));
        }

        if matches!(self.peek(tokens, *pos), Some(Attribute::BySymbol)) {
            let span = tokens[*pos].span;
            let leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(
                tokens,
                pos,
                &[Attribute::ToSymbol, Attribute::DownToSymbol, Attribute::WhileSymbol, Attribute::DoSymbol],
            );
            let mut kids = vec![leaf];
            kids.extend(body);
            children.push(self.wrap_list(Attribute::ByPart, kids, span));
        }

        if matches!(self.peek(tokens, *pos), Some(Attribute::ToSymbol) | Some(Attribute::DownToSymbol)) {
            let span = tokens[*pos].span;
            let leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(tokens, pos, &[Attribute::WhileSymbol, Attribute::DoSymbol]);
            let mut kids = vec![leaf];
            kids.extend(body);
            children.push(self.wrap_list(Attribute::ToPart, kids, span));
        }

        if matches!(self.peek(tokens, *pos), Some(Attribute::WhileSymbol)) {
            let span = tokens[*pos].span;
            let leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(tokens, pos, &[Attribute::DoSymbol]);
            let mut kids = vec![leaf];
            kids.extend(body);
            children.push(self.wrap_list(Attribute::WhilePart, kids, span));
        }

        if matches!(self.peek(tokens, *pos), Some(Attribute::DoSymbol)) {
            let span = tokens[*pos].span;
            let leaf = self.frame_leaf(tokens, pos);
            let body = self.frame_until(tokens, pos, &[Attribute::UntilSymbol, Attribute::OdSymbol]);
            let mut kids = vec![leaf];
            kids.extend(body);
            if self.peek(tokens, *pos) == Some(Attribute::UntilSymbol) {
                let until_span = tokens[*pos].span;
                let until_leaf = self.frame_leaf(tokens, pos);
                let until_body = self.frame_until(tokens, pos, &[Attribute::OdSymbol]);
                let mut until_kids = vec![until_leaf];
                until_kids.extend(until_body);
                kids.push(self.wrap_list(Attribute::UntilPart, until_kids, until_span));
            }
            self.expect(tokens, pos, Attribute::OdSymbol, "OD", span);
            children.push(self.wrap_list(Attribute::AltDoPart, kids, span));
        } else {
            self.handler.error("loop clause without a DO part".to_string(), loop_span);
        }

        self.wrap_list(Attribute::LoopClause, children, loop_span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68fc_util::CompileOptions;

    fn frame_source(source: &str) -> (NodeArena, NodeId) {
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
        (arena, root)
    }

    #[test]
    fn begin_end_becomes_closed_clause() {
        let (arena, root) = frame_source("BEGIN SKIP END");
        assert_eq!(arena.attr(root), Attribute::ClosedClause);
        assert!(arena.is_symmetric());
    }

    #[test]
    fn conditional_with_elif_nests_as_spec_describes() {
        let (arena, root) = frame_source("IF a THEN b ELIF c THEN d FI");
        assert_eq!(arena.attr(root), Attribute::ConditionalClause);
        let leaves = arena.leaves(root);
        assert!(!leaves.is_empty());
        assert!(arena.is_symmetric());
    }

    #[test]
    fn for_loop_has_from_to_and_alt_do_parts() {
        let (arena, root) = frame_source("FOR i FROM 1 TO 10 DO i OD");
        assert_eq!(arena.attr(root), Attribute::LoopClause);
        let sub = arena.get(root).sub.unwrap();
        let mut part_attrs = Vec::new();
        let mut cur = Some(sub);
        while let Some(id) = cur {
            part_attrs.push(arena.attr(id));
            cur = arena.next(id);
        }
        assert_eq!(
            part_attrs,
            vec![Attribute::ForPart, Attribute::FromPart, Attribute::ToPart, Attribute::AltDoPart]
        );
    }

    #[test]
    fn format_text_is_wrapped_between_dollar_signs() {
        let (arena, root) = frame_source("$d$");
        assert_eq!(arena.attr(root), Attribute::FormatText);
    }

    #[test]
    fn case_clause_has_case_in_and_esac_parts() {
        let (arena, root) = frame_source("CASE a IN b OUT c ESAC");
        assert_eq!(arena.attr(root), Attribute::CaseClause);
    }
}
