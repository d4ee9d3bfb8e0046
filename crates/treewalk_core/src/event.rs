//! Traversal events and the context handed to listeners.

use std::collections::VecDeque;

use treewalk_ast::{AstArena, Import, Imports, JavaNode, NodeKind, TreeMaker};

use crate::{RewriteError, RewriteSink, SharedState};

/// Whether an event marks the start or the end of a node's visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Enter,
    Exit,
}

/// The nodes enclosing a visited node, root first.
///
/// Every event carries its own copy, so listeners may keep it after the
/// callback returns.
#[derive(Debug, Clone, Default)]
pub struct AncestorPath<'a> {
    nodes: Vec<&'a JavaNode<'a>>,
}

impl<'a> AncestorPath<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: &'a JavaNode<'a>) {
        self.nodes.push(node);
    }

    pub(crate) fn pop(&mut self) -> Option<&'a JavaNode<'a>> {
        self.nodes.pop()
    }

    /// List view, root first.
    pub fn as_slice(&self) -> &[&'a JavaNode<'a>] {
        &self.nodes
    }

    /// Stack view: the innermost ancestor first.
    pub fn stack(&self) -> Vec<&'a JavaNode<'a>> {
        self.nodes.iter().rev().copied().collect()
    }

    /// Queue view: the root first.
    pub fn queue(&self) -> VecDeque<&'a JavaNode<'a>> {
        self.nodes.iter().copied().collect()
    }

    /// The immediate parent.
    pub fn parent(&self) -> Option<&'a JavaNode<'a>> {
        self.nodes.last().copied()
    }

    /// The outermost ancestor.
    pub fn root(&self) -> Option<&'a JavaNode<'a>> {
        self.nodes.first().copied()
    }

    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The innermost ancestor of `kind`.
    pub fn nearest(&self, kind: NodeKind) -> Option<&'a JavaNode<'a>> {
        self.nodes.iter().rev().copied().find(|n| n.kind() == kind)
    }

    /// Returns true if `node` (by identity) is an ancestor.
    pub fn contains(&self, node: &JavaNode<'_>) -> bool {
        self.nodes.iter().any(|n| n.same_as(node))
    }

    /// Kinds of the ancestors, root first.
    pub fn kinds(&self) -> Vec<NodeKind> {
        self.nodes.iter().map(|n| n.kind()).collect()
    }
}

/// One notification about one node.
#[derive(Debug, Clone)]
pub struct TraversalEvent<'a, 'e> {
    kind: NodeKind,
    node: &'a JavaNode<'a>,
    ancestors: AncestorPath<'a>,
    imports: Imports<'e, 'a>,
    phase: Phase,
}

impl<'a, 'e> TraversalEvent<'a, 'e> {
    pub(crate) fn new(
        node: &'a JavaNode<'a>,
        ancestors: AncestorPath<'a>,
        imports: &'e [Import<'a>],
        phase: Phase,
    ) -> Self {
        Self {
            kind: node.kind(),
            node,
            ancestors,
            imports: Imports::new(imports),
            phase,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn node(&self) -> &'a JavaNode<'a> {
        self.node
    }

    /// Enclosing nodes at the time the event was fired, root first.
    pub fn ancestors(&self) -> &AncestorPath<'a> {
        &self.ancestors
    }

    /// Shorthand for `ancestors().parent()`.
    pub fn parent(&self) -> Option<&'a JavaNode<'a>> {
        self.ancestors.parent()
    }

    /// Imports of the compilation unit being walked.
    pub fn imports(&self) -> Imports<'e, 'a> {
        self.imports
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Mutable context passed to listeners alongside each event.
///
/// It gives access to the arena (for building replacement nodes), the
/// caller's [`SharedState`] and the caller's [`RewriteSink`].
pub struct TraversalContext<'a, 'c> {
    arena: &'a AstArena,
    sink: &'c mut dyn RewriteSink<'a>,
    state: &'c mut SharedState<'a>,
    rewrites: usize,
}

impl<'a, 'c> TraversalContext<'a, 'c> {
    pub fn new(
        arena: &'a AstArena,
        sink: &'c mut dyn RewriteSink<'a>,
        state: &'c mut SharedState<'a>,
    ) -> Self {
        Self {
            arena,
            sink,
            state,
            rewrites: 0,
        }
    }

    pub fn arena(&self) -> &'a AstArena {
        self.arena
    }

    /// A node factory allocating in the tree's arena.
    pub fn maker(&self) -> TreeMaker<'a> {
        TreeMaker::new(self.arena)
    }

    pub fn state(&self) -> &SharedState<'a> {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut SharedState<'a> {
        self.state
    }

    /// Requests that `old` be replaced by `new`. The request is forwarded to
    /// the rewrite sink unchanged; the running traversal is not affected.
    pub fn rewrite(
        &mut self,
        old: &'a JavaNode<'a>,
        new: &'a JavaNode<'a>,
    ) -> Result<(), RewriteError> {
        self.sink.rewrite(old, new)?;
        self.rewrites += 1;
        Ok(())
    }

    /// Number of rewrite requests accepted through this context.
    pub fn rewrites_requested(&self) -> usize {
        self.rewrites
    }
}
