//! Arena allocator for syntax tree nodes.
//!
//! Uses `bumpalo` for bump allocation. All nodes of one compilation unit,
//! including every replacement node produced while rewriting, live in the
//! same arena and are freed together.

use bumpalo::Bump;

use crate::JavaNode;

/// Arena allocator for syntax tree nodes.
///
/// Because the arena never moves or frees a value before it is dropped,
/// the address of an allocated [`JavaNode`] is stable and doubles as the
/// node's identity.
///
/// # Example
///
/// ```rust
/// use treewalk_ast::AstArena;
///
/// let arena = AstArena::new();
///
/// let name = arena.alloc_str("LOGGER");
/// assert_eq!(name, "LOGGER");
/// ```
pub struct AstArena {
    bump: Bump,
}

impl AstArena {
    /// Creates a new arena allocator.
    #[inline]
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Creates a new arena with the specified initial capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Allocates a value in the arena and returns a reference to it.
    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    /// Allocates a node in the arena.
    #[inline]
    pub fn alloc_node<'a>(&'a self, node: JavaNode<'a>) -> &'a JavaNode<'a> {
        self.bump.alloc(node)
    }

    /// Allocates a string slice in the arena.
    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Allocates a slice in the arena by copying from the input slice.
    #[inline]
    pub fn alloc_slice_copy<T: Copy>(&self, slice: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(slice)
    }

    /// Allocates a list of node references, as used for child lists.
    #[inline]
    pub fn alloc_nodes<'a>(&'a self, nodes: &[&'a JavaNode<'a>]) -> &'a [&'a JavaNode<'a>] {
        self.bump.alloc_slice_copy(nodes)
    }

    /// Returns the total bytes allocated in this arena.
    #[inline]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for AstArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeData, Span};

    #[test]
    fn test_arena_alloc_str() {
        let arena = AstArena::new();
        let s = arena.alloc_str("java.util.logging.Logger");
        assert_eq!(s, "java.util.logging.Logger");
    }

    #[test]
    fn test_alloc_node_addresses_are_distinct() {
        let arena = AstArena::new();
        let first = arena.alloc_node(JavaNode::new(Span::empty(), NodeData::Break { label: None }));
        let second =
            arena.alloc_node(JavaNode::new(Span::empty(), NodeData::Break { label: None }));

        assert_ne!(first.id(), second.id());
        assert!(first.same_as(first));
        assert!(!first.same_as(second));
    }

    #[test]
    fn test_alloc_nodes_keeps_order() {
        let arena = AstArena::new();
        let a = arena.alloc_node(JavaNode::new(Span::new(0, 1), NodeData::EmptyStatement));
        let b = arena.alloc_node(JavaNode::new(Span::new(1, 2), NodeData::EmptyStatement));
        let list = arena.alloc_nodes(&[a, b]);

        assert_eq!(list.len(), 2);
        assert!(list[0].same_as(a));
        assert!(list[1].same_as(b));
        assert!(arena.allocated_bytes() > 0);
    }
}
