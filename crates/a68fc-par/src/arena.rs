//! The node arena: §3.1's append-only representation of the doubly-linked tree.
//!
//! A `Node` lives at a stable `NodeId` for the whole compile. `previous`/`next`/`sub`/
//! `nest` are `Option<NodeId>` rather than pointers, so splicing a reduced run under a
//! new parent is just rewriting a handful of `Option<NodeId>` fields — no individual
//! node is ever freed, matching the "arena released wholesale at compile end" lifecycle
//! note in the data model.

use a68fc_util::index_vec::{Idx, IndexVec};
use a68fc_util::{Span, Symbol};

use crate::attribute::Attribute;

/// An index into a [`NodeArena`]. Stable for the arena's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl Idx for NodeId {
    fn from_usize(idx: usize) -> Self {
        assert!(idx <= u32::MAX as usize, "node arena overflow");
        NodeId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single tree node: a lexical token while `sub` is `None` and attribute is a
/// terminal kind; a non-terminal once the reducer gives it a production attribute and
/// sub-children.
#[derive(Clone, Debug)]
pub struct Node {
    pub attribute: Attribute,
    pub symbol: Option<Symbol>,
    pub span: Span,
    pub priority: Option<u8>,
    pub previous: Option<NodeId>,
    pub next: Option<NodeId>,
    pub sub: Option<NodeId>,
    pub nest: Option<NodeId>,
    /// Routine-text nesting depth, set by the post-tree fixup pass (§4.I "procedure-
    /// level labeling"). Zero until that pass runs.
    pub procedure_level: u32,
}

impl Node {
    pub fn is_terminal(&self) -> bool {
        self.sub.is_none()
    }
}

/// Owns every `Node` created during a compile. Append-only: reduction never removes a
/// node, only relinks `previous`/`next`/`sub` to reflect the new tree shape.
#[derive(Default)]
pub struct NodeArena {
    nodes: IndexVec<NodeId, Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: IndexVec::new(),
        }
    }

    /// Inserts a freshly scanned terminal (no siblings linked yet — the caller links
    /// `previous`/`next` once the whole token stream has been read).
    pub fn alloc_terminal(
        &mut self,
        attribute: Attribute,
        symbol: Option<Symbol>,
        span: Span,
        priority: Option<u8>,
    ) -> NodeId {
        self.nodes.push(Node {
            attribute,
            symbol,
            span,
            priority,
            previous: None,
            next: None,
            sub: None,
            nest: None,
            procedure_level: 0,
        })
    }

    /// Synthesizes a non-terminal parent whose `sub` is `head` — the standard shape a
    /// `try_reduce` rewrite produces. The caller is responsible for relinking the
    /// parent into `head`'s old sibling position.
    pub fn alloc_parent(&mut self, attribute: Attribute, head: NodeId, span: Span) -> NodeId {
        self.nodes.push(Node {
            attribute,
            symbol: None,
            span,
            priority: None,
            previous: None,
            next: None,
            sub: Some(head),
            nest: None,
            procedure_level: 0,
        })
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attribute of `id`, for pattern-matching call sites that don't need the whole node.
    pub fn attr(&self, id: NodeId) -> Attribute {
        self.nodes[id].attribute
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].next
    }

    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].previous
    }

    /// Links `a.next = Some(b)` and `b.previous = Some(a)` — the one place the
    /// symmetry invariant (§8 property 2) is established, so every sibling-list edit
    /// goes through here or [`NodeArena::unlink`].
    pub fn link(&mut self, a: NodeId, b: NodeId) {
        self.nodes[a].next = Some(b);
        self.nodes[b].previous = Some(a);
    }

    /// Removes `id` from its sibling list, stitching its neighbors together. Used to
    /// drop superfluous semicolons (§4.G).
    pub fn unlink(&mut self, id: NodeId) {
        let prev = self.nodes[id].previous;
        let next = self.nodes[id].next;
        if let Some(p) = prev {
            self.nodes[p].next = next;
        }
        if let Some(n) = next {
            self.nodes[n].previous = prev;
        }
        self.nodes[id].previous = None;
        self.nodes[id].next = None;
    }

    /// Replaces the sibling run `[head..=tail]` with `parent` (whose `sub` is already
    /// `head`): `parent` is linked into the position `head` used to occupy, and the
    /// run's internal `previous`/`next` links are left untouched so leaves-first
    /// reading still recovers the original order (§8 property 1).
    pub fn splice_run(
        &mut self,
        head: NodeId,
        tail: NodeId,
        parent: NodeId,
        before: Option<NodeId>,
        after: Option<NodeId>,
    ) {
        self.nodes[head].previous = None;
        self.nodes[tail].next = None;
        self.nodes[parent].previous = before;
        self.nodes[parent].next = after;
        if let Some(b) = before {
            self.nodes[b].next = Some(parent);
        }
        if let Some(a) = after {
            self.nodes[a].previous = Some(parent);
        }
    }

    /// Yields the leaf terminals covered by `root` in left-to-right textual order,
    /// used by the round-trip property (§8) and by error-recovery phrase summaries.
    pub fn leaves(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(root, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let node = &self.nodes[id];
        if let Some(sub) = node.sub {
            let mut cur = Some(sub);
            while let Some(c) = cur {
                self.collect_leaves(c, out);
                cur = self.nodes[c].next;
            }
        } else {
            out.push(id);
        }
    }

    /// Checks linked-list symmetry (§8 property 2) over every node's `previous`/`next`.
    pub fn is_symmetric(&self) -> bool {
        for (id, node) in self.nodes.iter_enumerated() {
            if let Some(n) = node.next {
                if self.nodes[n].previous != Some(id) {
                    return false;
                }
            }
            if let Some(p) = node.previous {
                if self.nodes[p].next != Some(id) {
                    return false;
                }
            }
        }
        true
    }
}
