//! Pre- and post-validation of parsed macro trees.
//!
//! Validation runs in two phases per node. `pre` fires once a macro and its
//! arguments have been parsed but before any of its children exist; `post`
//! fires after all children have themselves been post-validated, against the
//! tree's `last` cursor. Each macro token binds to at most one ordered list
//! of pre-rules and one of post-rules (see [`rules`]); rule lists
//! short-circuit on the first rule that tells the walk to stop.
//!
//! Failure semantics: a rule that emits an error aborts the document. A rule
//! that emits a warning asks the injected [`DiagSink`] whether to continue,
//! which is the caller's whole warning policy. The `VALID` node flag makes
//! `post` idempotent.
//!
//! The walker mutates the tree only monotonically: node `VALID` flags, and
//! the document meta the prologue and section rules record (`title`, `date`,
//! `os`, `name`, and the advancing `lastnamed` marker).

use core_tree::{NodeFlags, NodeId, NodeKind, Tree};

pub mod diag;
mod rules;

pub use diag::{DiagSink, Diagnostic, Diagnostics, Severity, WarnKind};

use rules::Post;

/// Two-phase tree validator. Holds the tree being checked and the caller's
/// diagnostic sink for the duration of one walk.
pub struct Validator<'a> {
    pub(crate) tree: &'a mut Tree,
    pub(crate) sink: &'a mut dyn DiagSink,
}

impl<'a> Validator<'a> {
    pub fn new(tree: &'a mut Tree, sink: &'a mut dyn DiagSink) -> Self {
        Validator { tree, sink }
    }

    /// Pre-validate `node`. Call after argument parsing, before children.
    /// Returns whether the walk may continue.
    pub fn pre(&mut self, node: NodeId) -> bool {
        let n = self.tree.node(node);
        if n.kind == NodeKind::Text {
            return true;
        }
        assert!(n.kind != NodeKind::Root, "pre-validation of the root");
        let Some(tok) = n.tok else {
            // Table nodes carry no token and have no rules of their own.
            return true;
        };
        for rule in rules::valids(tok).pre {
            if !rule(self, node) {
                return false;
            }
        }
        true
    }

    /// Post-validate the tree's `last` node. Call after all children have
    /// been post-validated. Idempotent per node via the `VALID` flag.
    pub fn post(&mut self) -> bool {
        let last = self.tree.last;
        if self.tree.node(last).flags.contains(NodeFlags::VALID) {
            return true;
        }
        self.tree.node_mut(last).flags.insert(NodeFlags::VALID);

        match self.tree.node(last).kind {
            NodeKind::Text | NodeKind::Tbl => return true,
            NodeKind::Root => return rules::post_root(self),
            _ => {}
        }
        let Some(tok) = self.tree.node(last).tok else {
            return true;
        };
        for rule in rules::valids(tok).post {
            let ok = match rule {
                Post::Count(check) => rules::run_count(self, check),
                Post::Fn(f) => f(self),
            };
            if !ok {
                return false;
            }
        }
        true
    }

    // Diagnostic helpers, positioned like their emitting rules expect.

    pub(crate) fn err(&mut self, msg: &str) -> bool {
        let n = self.tree.node(self.tree.last);
        self.sink.err(n.line, n.col, msg)
    }

    pub(crate) fn nerr(&mut self, node: NodeId, msg: &str) -> bool {
        let n = self.tree.node(node);
        self.sink.err(n.line, n.col, msg)
    }

    pub(crate) fn perr(&mut self, line: usize, col: usize, msg: &str) -> bool {
        self.sink.err(line, col, msg)
    }

    pub(crate) fn warn(&mut self, kind: WarnKind, msg: &str) -> bool {
        let n = self.tree.node(self.tree.last);
        self.sink.warn(kind, n.line, n.col, msg)
    }

    pub(crate) fn nwarn(&mut self, node: NodeId, kind: WarnKind, msg: &str) -> bool {
        let n = self.tree.node(node);
        self.sink.warn(kind, n.line, n.col, msg)
    }

    fn walk(&mut self, id: NodeId) -> bool {
        if self.tree.node(id).kind != NodeKind::Root {
            self.tree.last = id;
            if !self.pre(id) {
                return false;
            }
        }
        let children: Vec<NodeId> = self.tree.children(id).collect();
        for child in children {
            if !self.walk(child) {
                return false;
            }
        }
        self.tree.last = id;
        self.post()
    }
}

/// Walk a fully built tree, pre- and post-validating every node in parser
/// order (pre on entry, post after children, root post last). Returns
/// whether the document survived.
pub fn validate(tree: &mut Tree, sink: &mut dyn DiagSink) -> bool {
    let root = tree.root();
    let mut v = Validator::new(tree, sink);
    v.walk(root)
}
