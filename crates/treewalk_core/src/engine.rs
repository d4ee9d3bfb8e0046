//! The traversal engine.
//!
//! [`Engine::traverse`] walks a class declaration depth-first. For every
//! node it fires an enter event, pushes the node onto the ancestor path,
//! walks the children in grammar order, pops the node and fires an exit
//! event. One walking procedure exists per structural category (class,
//! member, statement, expression, type). A node that the procedure for its
//! position does not model still gets both events, is reported to the
//! diagnostics sink and is not descended into.
//!
//! Listeners for a kind are snapshotted before each dispatch. A listener
//! registered or removed while an event is being dispatched takes effect
//! from the next dispatch on.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace, warn};
use treewalk_ast::{Category, CompilationUnit, Import, JavaNode, NodeData, NodeKind};

use crate::{
    AncestorPath, Diagnostic, DiagnosticSink, EngineConfig, LifecycleListener, LifecycleNotifier,
    ListenerRegistry, NodeListener, Phase, TracingSink, TraversalContext, TraversalError,
    TraversalEvent,
};

/// Counters for one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalSummary {
    /// Enter events fired.
    pub entered: usize,
    /// Exit events fired.
    pub exited: usize,
    /// Nodes reported as unrecognised.
    pub unrecognized: usize,
}

/// Walks syntax trees and dispatches events to registered listeners.
///
/// The engine is single-threaded. Registration methods take `&self`, so a
/// listener holding a handle to the engine may register or unregister
/// listeners from inside a callback.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use treewalk_ast::{AstArena, NodeKind, TreeMaker};
/// use treewalk_core::{
///     Engine, ListenerError, NodeListener, RewriteBatch, SharedState, TraversalContext,
///     TraversalEvent,
/// };
///
/// #[derive(Default)]
/// struct CountReturns(Cell<usize>);
///
/// impl NodeListener for CountReturns {
///     fn kind(&self) -> Option<NodeKind> {
///         Some(NodeKind::Return)
///     }
///
///     fn on_enter<'a>(
///         &self,
///         _event: &TraversalEvent<'a, '_>,
///         _cx: &mut TraversalContext<'a, '_>,
///     ) -> Result<(), ListenerError> {
///         self.0.set(self.0.get() + 1);
///         Ok(())
///     }
/// }
///
/// let arena = AstArena::new();
/// let make = TreeMaker::new(&arena);
/// let body = make.block(&[make.return_statement(None)]);
/// let class = make.class("Main", &[make.method("run", &[], None, Some(body))]);
///
/// let engine = Engine::new();
/// let counter = Rc::new(CountReturns::default());
/// engine.register(counter.clone());
///
/// let mut batch = RewriteBatch::new();
/// let mut state = SharedState::new();
/// let mut cx = TraversalContext::new(&arena, &mut batch, &mut state);
/// engine.traverse(class, &[], &mut cx).unwrap();
///
/// assert_eq!(counter.0.get(), 1);
/// ```
pub struct Engine {
    registry: RefCell<ListenerRegistry>,
    lifecycle: LifecycleNotifier,
    config: EngineConfig,
    diagnostics: Box<dyn DiagnosticSink>,
    in_progress: Cell<bool>,
}

impl Engine {
    /// Creates an engine with the default configuration, logging
    /// diagnostics through `tracing`.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: RefCell::new(ListenerRegistry::new()),
            lifecycle: LifecycleNotifier::new(),
            config,
            diagnostics: Box::new(TracingSink),
            in_progress: Cell::new(false),
        }
    }

    /// Replaces the diagnostics sink.
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers a node listener. See [`ListenerRegistry::register`].
    pub fn register(&self, listener: Rc<dyn NodeListener>) -> bool {
        self.registry.borrow_mut().register(listener)
    }

    /// Unregisters a node listener. See [`ListenerRegistry::unregister`].
    pub fn unregister(&self, listener: &Rc<dyn NodeListener>) -> bool {
        self.registry.borrow_mut().unregister(listener)
    }

    /// Listeners currently registered for exactly `kind`.
    pub fn listeners_for(&self, kind: NodeKind) -> Vec<Rc<dyn NodeListener>> {
        self.registry.borrow().lookup(kind).to_vec()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn add_lifecycle_listener(&self, listener: Rc<dyn LifecycleListener>) -> bool {
        self.lifecycle.add(listener)
    }

    pub fn remove_lifecycle_listener(&self, listener: &Rc<dyn LifecycleListener>) -> bool {
        self.lifecycle.remove(listener)
    }

    /// Returns true while a traversal is running.
    pub fn is_traversing(&self) -> bool {
        self.in_progress.get()
    }

    /// Walks the class declaration `root`.
    ///
    /// `imports` are exposed unchanged on every event. Lifecycle listeners
    /// are told about the beginning before the first event and about the end
    /// after the last one; the end is not announced when a listener fails.
    ///
    /// # Errors
    ///
    /// - [`TraversalError::ContractViolation`] if `root` is not a class
    ///   declaration or a traversal is already running on this engine.
    /// - [`TraversalError::Listener`] if a listener callback fails. The walk
    ///   stops at that callback.
    pub fn traverse<'a>(
        &self,
        root: &'a JavaNode<'a>,
        imports: &[Import<'a>],
        cx: &mut TraversalContext<'a, '_>,
    ) -> Result<TraversalSummary, TraversalError> {
        if root.kind() != NodeKind::Class {
            return Err(TraversalError::contract(format!(
                "traversal root must be a class declaration, got {}",
                root.kind()
            )));
        }
        let _guard = self.begin_traversal()?;

        debug!("Traversing class {}", root.name().unwrap_or("<anonymous>"));
        self.lifecycle.fire_begin();

        let mut walk = Walk::new(self, imports);
        walk.walk_class(root, cx)?;

        self.lifecycle.fire_end();
        debug!(
            entered = walk.summary.entered,
            unrecognized = walk.summary.unrecognized,
            "Traversal finished"
        );
        Ok(walk.summary)
    }

    /// Walks every top-level declaration of `unit` with the unit's imports,
    /// as one traversal.
    pub fn traverse_unit<'a>(
        &self,
        unit: &CompilationUnit<'a>,
        cx: &mut TraversalContext<'a, '_>,
    ) -> Result<TraversalSummary, TraversalError> {
        let _guard = self.begin_traversal()?;

        debug!(
            "Traversing {} type declaration(s) in package {}",
            unit.type_decls.len(),
            unit.package_name.unwrap_or("<default>")
        );
        self.lifecycle.fire_begin();

        let mut walk = Walk::new(self, unit.imports);
        for decl in unit.type_decls {
            walk.walk_class(decl, cx)?;
        }

        self.lifecycle.fire_end();
        Ok(walk.summary)
    }

    fn begin_traversal(&self) -> Result<InProgress<'_>, TraversalError> {
        if self.in_progress.replace(true) {
            return Err(TraversalError::contract(
                "a traversal is already running on this engine",
            ));
        }
        Ok(InProgress(&self.in_progress))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry.borrow())
            .field("lifecycle_listeners", &self.lifecycle.len())
            .field("config", &self.config)
            .field("in_progress", &self.in_progress.get())
            .finish()
    }
}

/// Clears the in-progress flag when a traversal ends, however it ends.
struct InProgress<'e>(&'e Cell<bool>);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// State of one running traversal.
struct Walk<'w, 'a> {
    engine: &'w Engine,
    imports: &'w [Import<'a>],
    path: AncestorPath<'a>,
    summary: TraversalSummary,
}

type WalkResult = Result<(), TraversalError>;

impl<'w, 'a> Walk<'w, 'a> {
    fn new(engine: &'w Engine, imports: &'w [Import<'a>]) -> Self {
        Self {
            engine,
            imports,
            path: AncestorPath::new(),
            summary: TraversalSummary::default(),
        }
    }

    fn walk_class(&mut self, node: &'a JavaNode<'a>, cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        let NodeData::Class { members, .. } = node.data else {
            return self.unrecognized(node, "class", cx);
        };
        self.visit(node, cx, |walk, cx| {
            for member in members {
                walk.walk_member(member, cx)?;
            }
            Ok(())
        })
    }

    fn walk_member(&mut self, node: &'a JavaNode<'a>, cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        match node.data {
            NodeData::Method {
                parameters,
                return_type,
                body,
                ..
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_statement_opt(body, cx)?;
                for parameter in parameters {
                    walk.walk_variable(parameter, cx)?;
                }
                walk.walk_type_opt(return_type, cx)
            }),
            NodeData::Variable { .. } => self.walk_variable(node, cx),
            NodeData::Block { .. } => self.walk_statement(node, cx),
            NodeData::Class { .. } => self.walk_class(node, cx),
            _ => self.unrecognized(node, "class member", cx),
        }
    }

    fn walk_variable(&mut self, node: &'a JavaNode<'a>, cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        let NodeData::Variable {
            var_type,
            initializer,
            ..
        } = node.data
        else {
            return self.unrecognized(node, "variable", cx);
        };
        self.visit(node, cx, |walk, cx| {
            walk.walk_type_opt(var_type, cx)?;
            walk.walk_expression_opt(initializer, cx)
        })
    }

    fn walk_statement_opt(
        &mut self,
        node: Option<&'a JavaNode<'a>>,
        cx: &mut TraversalContext<'a, '_>,
    ) -> WalkResult {
        match node {
            Some(node) => self.walk_statement(node, cx),
            None => Ok(()),
        }
    }

    fn walk_statement(&mut self, node: &'a JavaNode<'a>, cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        match node.data {
            NodeData::Block { statements, .. } => self.visit(node, cx, |walk, cx| {
                for statement in statements {
                    walk.walk_statement(statement, cx)?;
                }
                Ok(())
            }),
            NodeData::Variable { .. } => self.walk_variable(node, cx),
            NodeData::Class { .. } => self.walk_class(node, cx),
            NodeData::If {
                condition,
                then_branch,
                else_branch,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression(condition, cx)?;
                walk.walk_statement(then_branch, cx)?;
                walk.walk_statement_opt(else_branch, cx)
            }),
            NodeData::ForLoop {
                initializers,
                condition,
                updates,
                body,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression_opt(condition, cx)?;
                walk.walk_statement(body, cx)?;
                for initializer in initializers {
                    walk.walk_statement(initializer, cx)?;
                }
                for update in updates {
                    walk.walk_statement(update, cx)?;
                }
                Ok(())
            }),
            NodeData::EnhancedForLoop {
                variable,
                expression,
                body,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression(expression, cx)?;
                walk.walk_variable(variable, cx)?;
                walk.walk_statement(body, cx)
            }),
            NodeData::WhileLoop { condition, body } | NodeData::DoWhileLoop { body, condition } => {
                self.visit(node, cx, |walk, cx| {
                    walk.walk_expression(condition, cx)?;
                    walk.walk_statement(body, cx)
                })
            }
            NodeData::Try {
                block,
                catches,
                finally,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_statement(block, cx)?;
                for catch in catches {
                    walk.walk_statement(catch, cx)?;
                }
                walk.walk_statement_opt(finally, cx)
            }),
            NodeData::Catch { parameter, block } => self.visit(node, cx, |walk, cx| {
                walk.walk_variable(parameter, cx)?;
                walk.walk_statement(block, cx)
            }),
            NodeData::Switch { selector, cases } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression(selector, cx)?;
                for case in cases {
                    walk.walk_statement(case, cx)?;
                }
                Ok(())
            }),
            NodeData::Case { label, statements } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression_opt(label, cx)?;
                for statement in statements {
                    walk.walk_statement(statement, cx)?;
                }
                Ok(())
            }),
            NodeData::Return { expression } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression_opt(expression, cx)
            }),
            NodeData::Throw { expression } | NodeData::ExpressionStatement { expression } => {
                self.visit(node, cx, |walk, cx| walk.walk_expression(expression, cx))
            }
            NodeData::Break { .. } | NodeData::Continue { .. } | NodeData::EmptyStatement => {
                self.visit(node, cx, |_, _| Ok(()))
            }
            _ => self.unrecognized(node, "statement", cx),
        }
    }

    fn walk_expression_opt(
        &mut self,
        node: Option<&'a JavaNode<'a>>,
        cx: &mut TraversalContext<'a, '_>,
    ) -> WalkResult {
        match node {
            Some(node) => self.walk_expression(node, cx),
            None => Ok(()),
        }
    }

    fn walk_expressions(
        &mut self,
        nodes: &'a [&'a JavaNode<'a>],
        cx: &mut TraversalContext<'a, '_>,
    ) -> WalkResult {
        for node in nodes {
            self.walk_expression(node, cx)?;
        }
        Ok(())
    }

    fn walk_expression(&mut self, node: &'a JavaNode<'a>, cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        match node.data {
            NodeData::MethodInvocation {
                method_select,
                type_arguments,
                arguments,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression(method_select, cx)?;
                walk.walk_expressions(arguments, cx)?;
                walk.walk_types(type_arguments, cx)
            }),
            NodeData::MemberSelect { expression, .. } => {
                self.visit(node, cx, |walk, cx| walk.walk_expression(expression, cx))
            }
            NodeData::Identifier { .. } | NodeData::Literal { .. } => {
                self.visit(node, cx, |_, _| Ok(()))
            }
            NodeData::Assignment {
                variable,
                expression,
            }
            | NodeData::CompoundAssignment {
                variable,
                expression,
                ..
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression(variable, cx)?;
                walk.walk_expression(expression, cx)
            }),
            NodeData::Binary { left, right, .. } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression(left, cx)?;
                walk.walk_expression(right, cx)
            }),
            NodeData::Unary { operand, .. } => {
                self.visit(node, cx, |walk, cx| walk.walk_expression(operand, cx))
            }
            NodeData::Parenthesized { expression } => {
                self.visit(node, cx, |walk, cx| walk.walk_expression(expression, cx))
            }
            NodeData::TypeCast {
                target_type,
                expression,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_type(target_type, cx)?;
                walk.walk_expression(expression, cx)
            }),
            NodeData::ArrayAccess { expression, index } => self.visit(node, cx, |walk, cx| {
                walk.walk_expression(expression, cx)?;
                walk.walk_expression(index, cx)
            }),
            NodeData::NewArray {
                element_type,
                dimensions,
                initializers,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_type_opt(element_type, cx)?;
                walk.walk_expressions(dimensions, cx)?;
                walk.walk_expressions(initializers, cx)
            }),
            NodeData::NewClass {
                enclosing,
                identifier,
                type_arguments,
                arguments,
                class_body,
            } => self.visit(node, cx, |walk, cx| {
                walk.walk_type(identifier, cx)?;
                walk.walk_expression_opt(enclosing, cx)?;
                if let Some(body) = class_body {
                    walk.walk_class(body, cx)?;
                }
                walk.walk_types(type_arguments, cx)?;
                walk.walk_expressions(arguments, cx)
            }),
            // `int.class`, `String[].class`: type references in receiver
            // position.
            NodeData::PrimitiveType { .. }
            | NodeData::ArrayType { .. }
            | NodeData::ParameterizedType { .. } => self.walk_type(node, cx),
            _ => self.unrecognized(node, "expression", cx),
        }
    }

    fn walk_type_opt(
        &mut self,
        node: Option<&'a JavaNode<'a>>,
        cx: &mut TraversalContext<'a, '_>,
    ) -> WalkResult {
        match node {
            Some(node) => self.walk_type(node, cx),
            None => Ok(()),
        }
    }

    fn walk_types(&mut self, nodes: &'a [&'a JavaNode<'a>], cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        for node in nodes {
            self.walk_type(node, cx)?;
        }
        Ok(())
    }

    fn walk_type(&mut self, node: &'a JavaNode<'a>, cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        match node.data {
            NodeData::Identifier { .. } | NodeData::PrimitiveType { .. } => {
                self.visit(node, cx, |_, _| Ok(()))
            }
            NodeData::MemberSelect { expression, .. } => {
                self.visit(node, cx, |walk, cx| walk.walk_expression(expression, cx))
            }
            NodeData::ArrayType { element } => {
                self.visit(node, cx, |walk, cx| walk.walk_type(element, cx))
            }
            NodeData::ParameterizedType { base, arguments } => self.visit(node, cx, |walk, cx| {
                walk.walk_type(base, cx)?;
                walk.walk_types(arguments, cx)
            }),
            _ => self.unrecognized(node, "type", cx),
        }
    }

    /// Walks a node found somewhere the grammar leaves open (the children
    /// of an `Unknown` node), choosing the procedure from its category.
    fn walk_any(&mut self, node: &'a JavaNode<'a>, cx: &mut TraversalContext<'a, '_>) -> WalkResult {
        match node.category() {
            Category::Declaration => self.walk_member(node, cx),
            Category::Statement => self.walk_statement(node, cx),
            Category::Expression => self.walk_expression(node, cx),
            Category::Type => self.walk_type(node, cx),
            Category::Other => self.unrecognized(node, "unknown construct", cx),
        }
    }

    /// Fires both events for a node the current procedure does not model
    /// and reports it.
    fn unrecognized(
        &mut self,
        node: &'a JavaNode<'a>,
        position: &str,
        cx: &mut TraversalContext<'a, '_>,
    ) -> WalkResult {
        self.summary.unrecognized += 1;
        if self.engine.config.report_unrecognized {
            let mut diagnostic = Diagnostic::new(
                node.kind(),
                node.span,
                format!("Unrecognized {} in {} position", node.kind(), position),
            )
            .with_parent(self.path.parent().map(|parent| parent.kind()));
            if let NodeData::Unknown { label, .. } = node.data {
                diagnostic = diagnostic.with_label(label);
            }
            self.engine.diagnostics.report(diagnostic);
        }

        let descend = self.engine.config.descend_into_unknown;
        self.visit(node, cx, |walk, cx| match node.data {
            NodeData::Unknown { children, .. } if descend => {
                for child in children {
                    walk.walk_any(child, cx)?;
                }
                Ok(())
            }
            _ => Ok(()),
        })
    }

    fn visit(
        &mut self,
        node: &'a JavaNode<'a>,
        cx: &mut TraversalContext<'a, '_>,
        children: impl FnOnce(&mut Self, &mut TraversalContext<'a, '_>) -> WalkResult,
    ) -> WalkResult {
        self.fire(node, Phase::Enter, cx)?;
        self.path.push(node);
        let result = children(self, cx);
        self.path.pop();
        result?;
        self.fire(node, Phase::Exit, cx)
    }

    fn fire(
        &mut self,
        node: &'a JavaNode<'a>,
        phase: Phase,
        cx: &mut TraversalContext<'a, '_>,
    ) -> WalkResult {
        match phase {
            Phase::Enter => self.summary.entered += 1,
            Phase::Exit => self.summary.exited += 1,
        }

        let kind = node.kind();
        if self.engine.config.trace_events {
            trace!(%kind, ?phase, depth = self.path.depth(), "event");
        }

        let listeners = self.engine.listeners_for(kind);
        if listeners.is_empty() {
            return Ok(());
        }

        let event = TraversalEvent::new(node, self.path.clone(), self.imports, phase);
        for listener in &listeners {
            let result = match phase {
                Phase::Enter => listener.on_enter(&event, cx),
                Phase::Exit => listener.on_exit(&event, cx),
            };
            if let Err(e) = result {
                warn!("Listener {} failed on {}: {}", listener.name(), kind, e);
                return Err(e.into());
            }
        }
        Ok(())
    }
}
