//! # treewalk_core
//!
//! Traversal and event dispatch over `treewalk_ast` trees.
//!
//! This crate provides:
//! - The [`Engine`], a recursive-descent walker that fires enter/exit events
//!   for every node of a class declaration
//! - A kind-scoped [`ListenerRegistry`] of [`NodeListener`]s
//! - [`TraversalEvent`]s carrying the node, a copy of its ancestor path and
//!   the unit's imports
//! - A [`SharedState`] store for memoising work across nodes
//! - Rewrite coordination through a [`RewriteSink`], with [`RewriteBatch`]
//!   producing new tree versions
//! - Begin/end notifications through [`LifecycleListener`]s
//!
//! ## Example
//!
//! ```rust,ignore
//! use treewalk_core::{Engine, EngineConfig, RewriteBatch, SharedState, TraversalContext};
//!
//! let engine = Engine::with_config(EngineConfig::from_file("treewalk.json")?);
//! engine.register(Rc::new(PrintlnToLogger::default()));
//!
//! let mut batch = RewriteBatch::new();
//! let mut state = SharedState::new();
//! let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
//! engine.traverse_unit(&unit, &mut cx)?;
//!
//! let rewritten = batch.apply(&arena, unit.type_decls[0]);
//! ```

mod config;
mod diagnostics;
mod engine;
mod error;
mod event;
mod lifecycle;
mod registry;
mod rewrite;
mod state;

pub use config::EngineConfig;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use engine::{Engine, TraversalSummary};
pub use error::{ConfigError, ListenerError, RewriteError, TraversalError};
pub use event::{AncestorPath, Phase, TraversalContext, TraversalEvent};
pub use lifecycle::{LifecycleListener, LifecycleNotifier};
pub use registry::{ListenerRegistry, NodeListener, subscription_kind};
pub use rewrite::{RewriteBatch, RewriteRequest, RewriteSink, check_replacement};
pub use state::{SharedState, StateValue};
