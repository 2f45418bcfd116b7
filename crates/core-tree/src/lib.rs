//! Arena-backed macro tree for the semantic documentation dialect.
//!
//! A parsed document is a tree of typed nodes: one `Root`, `Block` nodes
//! with their `Head`/`Body` (and optional `Tail`) children, flat `Elem`
//! nodes, `Text` leaves, and `Tbl` nodes referencing externally owned table
//! spans. Nodes live in a single arena owned by [`Tree`]; all structural
//! links (parent, first/last child, siblings) are arena indices, so the
//! pointer-rich shape of the dialect is represented without reference
//! cycles or shared ownership.
//!
//! Invariants maintained by the builder API:
//! * `Root` carries no token.
//! * A `Block` built with [`Tree::block`] always has `Head` and `Body`
//!   children, in that order; `Tail` is optional and appended last.
//! * `Text` nodes are leaves.
//! * Source positions are whatever the caller supplies; parsers emit them
//!   monotonically non-decreasing in pre-order.
//!
//! The tree also carries the document [`Meta`] record and the `last`
//! cursor, the "most recently processed node" maintained by whoever drives
//! parsing or validation.

use bitflags::bitflags;
use smallvec::SmallVec;

pub mod dump;
pub mod section;
pub mod token;

pub use section::{Msec, Section};
pub use token::{MacroArg, Token};

/// Index of a node in its [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Block,
    Head,
    Body,
    Tail,
    Elem,
    Text,
    Tbl,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Block => "block",
            NodeKind::Head => "block-head",
            NodeKind::Body => "block-body",
            NodeKind::Tail => "block-tail",
            NodeKind::Elem => "elem",
            NodeKind::Text => "text",
            NodeKind::Tbl => "tbl",
        }
    }
}

bitflags! {
    /// Per-node flag bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// Set once post-validation has run; makes a second post a no-op.
        const VALID = 1 << 0;
    }
}

/// One parsed macro argument: identifier, source position, optional values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub arg: MacroArg,
    pub line: usize,
    pub col: usize,
    pub values: Vec<String>,
}

impl Arg {
    pub fn new(arg: MacroArg) -> Self {
        Arg {
            arg,
            line: 0,
            col: 0,
            values: Vec::new(),
        }
    }

    pub fn with_values<I, S>(arg: MacroArg, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arg {
            arg,
            line: 0,
            col: 0,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Argument vector; most macros carry zero or one argument.
pub type Args = SmallVec<[Arg; 2]>;

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    /// Root, Head, Body, and Tail nodes carry no payload.
    #[default]
    None,
    Text(String),
    Elem(Args),
    Block {
        args: Args,
        head: Option<NodeId>,
        body: Option<NodeId>,
        tail: Option<NodeId>,
    },
    /// Index of a table span in caller-owned storage.
    Table(usize),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub tok: Option<Token>,
    pub line: usize,
    pub col: usize,
    pub flags: NodeFlags,
    pub payload: Payload,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next: Option<NodeId>,
    prev: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, tok: Option<Token>, line: usize, col: usize, payload: Payload) -> Self {
        Node {
            kind,
            tok,
            line,
            col,
            flags: NodeFlags::empty(),
            payload,
            parent: None,
            first_child: None,
            last_child: None,
            next: None,
            prev: None,
        }
    }

    /// Text content, for `Text` nodes.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Argument vector of an `Elem` or `Block` node; empty for others.
    pub fn args(&self) -> &[Arg] {
        match &self.payload {
            Payload::Elem(args) => args,
            Payload::Block { args, .. } => args,
            _ => &[],
        }
    }
}

/// Block sub-node handles returned by [`Tree::block`].
#[derive(Debug, Clone, Copy)]
pub struct BlockIds {
    pub block: NodeId,
    pub head: NodeId,
    pub body: NodeId,
}

/// Document meta record, populated during prologue validation.
#[derive(Debug, Clone)]
pub struct Meta {
    pub title: Option<String>,
    /// Epoch seconds; 0 means "not yet set".
    pub date: i64,
    pub os: Option<String>,
    pub name: Option<String>,
    pub vol: Option<String>,
    pub msec: Msec,
    /// Highest-ordered named section seen so far; only ever advances.
    pub lastnamed: Section,
}

impl Default for Meta {
    fn default() -> Self {
        Meta {
            title: None,
            date: 0,
            os: None,
            name: None,
            vol: None,
            msec: Msec::Default,
            lastnamed: Section::Prologue,
        }
    }
}

/// The arena and the document-level state that travels with it.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Most recently processed node; maintained by the parser or walker.
    pub last: NodeId,
    pub meta: Meta,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Root, None, 0, 0, Payload::None);
        Tree {
            nodes: vec![root],
            root: NodeId(0),
            last: NodeId(0),
            meta: Meta::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev
    }

    /// Iterate the direct children of `id` in order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            cur: self.node(id).first_child,
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Iterate `id`'s ancestors, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            cur: self.node(id).parent,
        }
    }

    fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.nodes[id.index()].parent = Some(parent);
        match self.nodes[parent.index()].last_child {
            Some(prev) => {
                self.nodes[prev.index()].next = Some(id);
                self.nodes[id.index()].prev = Some(prev);
            }
            None => self.nodes[parent.index()].first_child = Some(id),
        }
        self.nodes[parent.index()].last_child = Some(id);
        id
    }

    /// Create a `Block` with its `Head` and `Body`, in that order.
    pub fn block(&mut self, parent: NodeId, tok: Token, args: Args) -> BlockIds {
        self.block_at(parent, tok, args, 0, 0)
    }

    pub fn block_at(
        &mut self,
        parent: NodeId,
        tok: Token,
        args: Args,
        line: usize,
        col: usize,
    ) -> BlockIds {
        let block = self.append(
            parent,
            Node::new(
                NodeKind::Block,
                Some(tok),
                line,
                col,
                Payload::Block {
                    args,
                    head: None,
                    body: None,
                    tail: None,
                },
            ),
        );
        let head = self.append(
            block,
            Node::new(NodeKind::Head, Some(tok), line, col, Payload::None),
        );
        let body = self.append(
            block,
            Node::new(NodeKind::Body, Some(tok), line, col, Payload::None),
        );
        if let Payload::Block {
            head: h, body: b, ..
        } = &mut self.nodes[block.index()].payload
        {
            *h = Some(head);
            *b = Some(body);
        }
        BlockIds { block, head, body }
    }

    /// Append the optional `Tail` to an existing block.
    pub fn tail(&mut self, block: NodeId) -> NodeId {
        assert_eq!(self.node(block).kind, NodeKind::Block);
        let tok = self.node(block).tok;
        let (line, col) = (self.node(block).line, self.node(block).col);
        let tail = self.append(
            block,
            Node::new(NodeKind::Tail, tok, line, col, Payload::None),
        );
        if let Payload::Block { tail: t, .. } = &mut self.nodes[block.index()].payload {
            *t = Some(tail);
        }
        tail
    }

    pub fn elem(&mut self, parent: NodeId, tok: Token, args: Args) -> NodeId {
        self.elem_at(parent, tok, args, 0, 0)
    }

    pub fn elem_at(
        &mut self,
        parent: NodeId,
        tok: Token,
        args: Args,
        line: usize,
        col: usize,
    ) -> NodeId {
        self.append(
            parent,
            Node::new(NodeKind::Elem, Some(tok), line, col, Payload::Elem(args)),
        )
    }

    pub fn text(&mut self, parent: NodeId, s: impl Into<String>) -> NodeId {
        self.text_at(parent, s, 0, 0)
    }

    pub fn text_at(
        &mut self,
        parent: NodeId,
        s: impl Into<String>,
        line: usize,
        col: usize,
    ) -> NodeId {
        self.append(
            parent,
            Node::new(NodeKind::Text, None, line, col, Payload::Text(s.into())),
        )
    }

    pub fn table(&mut self, parent: NodeId, span: usize, line: usize, col: usize) -> NodeId {
        self.append(
            parent,
            Node::new(NodeKind::Tbl, None, line, col, Payload::Table(span)),
        )
    }

    /// Head of a block node. Panics if `id` is not a block built with
    /// [`Tree::block`]; a block without a head is a construction bug.
    pub fn block_head(&self, id: NodeId) -> NodeId {
        match self.node(id).payload {
            Payload::Block {
                head: Some(head), ..
            } => head,
            _ => panic!("block_head on non-block node"),
        }
    }

    pub fn block_body(&self, id: NodeId) -> NodeId {
        match self.node(id).payload {
            Payload::Block {
                body: Some(body), ..
            } => body,
            _ => panic!("block_body on non-block node"),
        }
    }

    pub fn block_tail(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).payload {
            Payload::Block { tail, .. } => tail,
            _ => None,
        }
    }

    /// Concatenate the text children of `id`, space-separated, into `buf`.
    /// Returns `false` when the result would exceed `buf`'s remaining
    /// capacity limit `max`.
    pub fn concat_text(&self, id: NodeId, buf: &mut String, max: usize) -> bool {
        for (i, child) in self.children(id).enumerate() {
            let Some(s) = self.node(child).text() else {
                continue;
            };
            if i > 0 {
                buf.push(' ');
            }
            buf.push_str(s);
            if buf.len() > max {
                return false;
            }
        }
        true
    }
}

pub struct Children<'a> {
    tree: &'a Tree,
    cur: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.tree.node(id).next;
        Some(id)
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    cur: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.tree.node(id).parent;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    #[test]
    fn root_has_no_token() {
        let t = Tree::new();
        assert_eq!(t.node(t.root()).kind, NodeKind::Root);
        assert!(t.node(t.root()).tok.is_none());
    }

    #[test]
    fn block_has_head_then_body() {
        let mut t = Tree::new();
        let root = t.root();
        let sh = t.block(root, Token::Sh, Args::new());
        let kinds: Vec<NodeKind> = t.children(sh.block).map(|c| t.node(c).kind).collect();
        assert_eq!(kinds, vec![NodeKind::Head, NodeKind::Body]);
        assert_eq!(t.block_head(sh.block), sh.head);
        assert_eq!(t.block_body(sh.block), sh.body);
        assert_eq!(t.block_tail(sh.block), None);
    }

    #[test]
    fn tail_is_appended_last() {
        let mut t = Tree::new();
        let root = t.root();
        let eo = t.block(root, Token::Eo, Args::new());
        let tail = t.tail(eo.block);
        assert_eq!(t.block_tail(eo.block), Some(tail));
        assert_eq!(t.children(eo.block).last(), Some(tail));
    }

    #[test]
    fn sibling_and_ancestor_walks() {
        let mut t = Tree::new();
        let root = t.root();
        let sh = t.block(root, Token::Sh, Args::new());
        let a = t.text(sh.body, "a");
        let b = t.text(sh.body, "b");
        assert_eq!(t.next_sibling(a), Some(b));
        assert_eq!(t.prev_sibling(b), Some(a));
        assert_eq!(t.child_count(sh.body), 2);
        let up: Vec<NodeId> = t.ancestors(a).collect();
        assert_eq!(up, vec![sh.body, sh.block, root]);
    }

    #[test]
    fn elem_args_are_reachable() {
        let mut t = Tree::new();
        let root = t.root();
        let ex = t.elem(root, Token::Ex, smallvec![Arg::new(MacroArg::Std)]);
        assert_eq!(t.node(ex).args().len(), 1);
        assert_eq!(t.node(ex).args()[0].arg, MacroArg::Std);
    }

    #[test]
    fn concat_text_joins_with_spaces() {
        let mut t = Tree::new();
        let root = t.root();
        let sh = t.block(root, Token::Sh, Args::new());
        t.text(sh.head, "SEE");
        t.text(sh.head, "ALSO");
        let mut buf = String::new();
        assert!(t.concat_text(sh.head, &mut buf, 64));
        assert_eq!(buf, "SEE ALSO");
    }

    #[test]
    fn table_nodes_reference_external_spans() {
        let mut t = Tree::new();
        let root = t.root();
        let tbl = t.table(root, 3, 7, 1);
        assert_eq!(t.node(tbl).kind, NodeKind::Tbl);
        assert!(t.node(tbl).tok.is_none());
        assert_eq!(t.node(tbl).payload, Payload::Table(3));
    }

    #[test]
    fn concat_text_reports_overflow() {
        let mut t = Tree::new();
        let root = t.root();
        let sh = t.block(root, Token::Sh, Args::new());
        t.text(sh.head, "X".repeat(80));
        let mut buf = String::new();
        assert!(!t.concat_text(sh.head, &mut buf, 64));
    }
}
