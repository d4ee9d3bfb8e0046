//! # treewalk_ast
//!
//! Syntax tree types consumed by the treewalk traversal engine.
//!
//! The tree models the structural subset of Java that the engine walks:
//! class declarations, methods, variables, blocks, statements, expressions
//! and type references. It is produced by a host front end; this crate only
//! defines the shape and offers a [`TreeMaker`] for building nodes.
//!
//! ## Architecture
//!
//! - Uses `bumpalo` for arena allocation, one arena per compilation unit
//! - Nodes are immutable once allocated and reference their children by
//!   `&'a JavaNode<'a>`
//! - Node identity is the arena address ([`NodeId`]), so two structurally
//!   equal statements at different locations stay distinguishable
//! - "Replacing" a node allocates a new node; every reference taken before
//!   the replacement stays valid for the lifetime of the arena
//!
//! ## Example
//!
//! ```rust
//! use treewalk_ast::{AstArena, NodeKind, TreeMaker};
//!
//! let arena = AstArena::new();
//! let make = TreeMaker::new(&arena);
//!
//! let call = make.invocation(make.qualified_name("System.out.println"), &[make.string_literal("hi")]);
//! let body = make.block(&[make.expression_statement(call)]);
//! let method = make.method("main", &[], None, Some(body));
//! let class = make.class("Main", &[method]);
//!
//! assert_eq!(class.kind(), NodeKind::Class);
//! ```

mod arena;
mod compare;
mod imports;
mod kind;
mod maker;
mod node;
mod span;

pub use arena::AstArena;
pub use compare::{compare_methods, compare_variables, type_simple_name};
pub use imports::{CompilationUnit, Import, Imports};
pub use kind::{Category, NodeKind};
pub use maker::TreeMaker;
pub use node::{
    BinaryOperator, JavaNode, LiteralValue, NodeData, NodeId, NodeList, NodeRef, PrimitiveKind,
    UnaryOperator,
};
pub use span::Span;
