//! Rewrite coordination.
//!
//! Listeners never edit the tree they are walking. They hand
//! `(old, new)` pairs to a [`RewriteSink`] chosen by the caller. The
//! [`RewriteBatch`] sink records them and, once the traversal is over,
//! produces a new version of the tree in which every request is applied.
//!
//! Because nodes are immutable and arena-allocated, applying a batch copies
//! only the nodes on the paths from the root to the rewritten nodes. The
//! previous root stays valid and unchanged.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};
use treewalk_ast::{AstArena, JavaNode, NodeId};

use crate::RewriteError;

/// Receives rewrite requests from listeners.
pub trait RewriteSink<'a> {
    /// Records that `old` should be replaced by `new`.
    fn rewrite(&mut self, old: &'a JavaNode<'a>, new: &'a JavaNode<'a>)
    -> Result<(), RewriteError>;
}

impl<'a, F> RewriteSink<'a> for F
where
    F: FnMut(&'a JavaNode<'a>, &'a JavaNode<'a>) -> Result<(), RewriteError>,
{
    fn rewrite(
        &mut self,
        old: &'a JavaNode<'a>,
        new: &'a JavaNode<'a>,
    ) -> Result<(), RewriteError> {
        self(old, new)
    }
}

/// One recorded request.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRequest<'a> {
    pub old: &'a JavaNode<'a>,
    pub new: &'a JavaNode<'a>,
}

/// Checks that `new` can stand where `old` stands.
///
/// Declarations and statements are interchangeable (a block can become a
/// class member), as are expressions and type references. `Other` nodes are
/// compatible with everything.
pub fn check_replacement(old: &JavaNode<'_>, new: &JavaNode<'_>) -> Result<(), RewriteError> {
    let (old_category, new_category) = (old.category(), new.category());
    let mismatch = (old_category.is_statement_like() && new_category.is_expression_like())
        || (old_category.is_expression_like() && new_category.is_statement_like());
    if mismatch {
        return Err(RewriteError::CategoryMismatch {
            old_kind: old.kind(),
            old_category,
            new_kind: new.kind(),
            new_category,
        });
    }
    Ok(())
}

/// Records rewrite requests in order and applies them as one tree version.
///
/// # Example
///
/// ```rust
/// use treewalk_ast::{AstArena, TreeMaker};
/// use treewalk_core::{RewriteBatch, RewriteSink};
///
/// let arena = AstArena::new();
/// let make = TreeMaker::new(&arena);
/// let old = make.return_statement(None);
/// let root = make.class("Main", &[make.method("run", &[], None, Some(make.block(&[old])))]);
///
/// let mut batch = RewriteBatch::new();
/// batch.rewrite(old, make.throw_statement(make.identifier("e"))).unwrap();
///
/// let rewritten = batch.apply(&arena, root);
/// assert!(!rewritten.same_as(root));
/// ```
#[derive(Debug, Default, Clone)]
pub struct RewriteBatch<'a> {
    requests: Vec<RewriteRequest<'a>>,
}

impl<'a> RewriteBatch<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests in the order they were recorded.
    pub fn requests(&self) -> &[RewriteRequest<'a>] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Returns the replacement recorded last for `old`.
    pub fn replacement_for(&self, old: &JavaNode<'_>) -> Option<&'a JavaNode<'a>> {
        self.requests
            .iter()
            .rev()
            .find(|request| request.old.same_as(old))
            .map(|request| request.new)
    }

    /// Builds the tree version in which every recorded request is applied.
    ///
    /// Replacements are applied top-down. When a replacement subtree still
    /// contains original nodes that have requests of their own, those are
    /// applied as well, so that wrapping a statement in a new block and
    /// rewriting an expression inside that statement compose. A request is
    /// never applied again inside its own replacement. When the same node was
    /// requested more than once, the last request wins.
    ///
    /// Returns `root` itself when nothing under it changed.
    pub fn apply(&self, arena: &'a AstArena, root: &'a JavaNode<'a>) -> &'a JavaNode<'a> {
        let mut replacements: HashMap<NodeId, &'a JavaNode<'a>> = HashMap::new();
        for request in &self.requests {
            if replacements.insert(request.old.id(), request.new).is_some() {
                warn!(
                    "{} rewritten more than once; keeping the last request",
                    request.old.kind()
                );
            }
        }

        let mut applier = Applier {
            arena,
            replacements,
            active: Vec::new(),
            applied: HashSet::new(),
        };
        let result = applier.rebuild(root);

        let unreached = applier.replacements.len() - applier.applied.len();
        if unreached > 0 {
            debug!(
                "{} rewrite(s) target nodes not reachable from the root",
                unreached
            );
        }
        result
    }
}

impl<'a> RewriteSink<'a> for RewriteBatch<'a> {
    fn rewrite(
        &mut self,
        old: &'a JavaNode<'a>,
        new: &'a JavaNode<'a>,
    ) -> Result<(), RewriteError> {
        check_replacement(old, new)?;
        self.requests.push(RewriteRequest { old, new });
        Ok(())
    }
}

struct Applier<'a> {
    arena: &'a AstArena,
    replacements: HashMap<NodeId, &'a JavaNode<'a>>,
    /// Requests whose replacement is currently being rebuilt.
    active: Vec<NodeId>,
    applied: HashSet<NodeId>,
}

impl<'a> Applier<'a> {
    fn rebuild(&mut self, node: &'a JavaNode<'a>) -> &'a JavaNode<'a> {
        let id = node.id();
        if let Some(&replacement) = self.replacements.get(&id) {
            if !self.active.contains(&id) {
                self.applied.insert(id);
                self.active.push(id);
                let rebuilt = self.rebuild(replacement);
                self.active.pop();
                return rebuilt;
            }
        }

        let arena = self.arena;
        let mapped = node.map_children(arena, |child| {
            Ok::<_, std::convert::Infallible>(self.rebuild(child))
        });
        match mapped {
            Ok(Some(rebuilt)) => arena.alloc_node(rebuilt),
            _ => node,
        }
    }
}
