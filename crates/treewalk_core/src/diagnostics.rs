//! Reporting of constructs the walker does not model.
//!
//! These are not errors: the traversal continues past them. The engine hands
//! each one to the [`DiagnosticSink`] it was built with.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;
use treewalk_ast::{NodeKind, Span};

/// A construct the walker could not descend into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Kind of the unrecognised node.
    pub kind: NodeKind,
    /// Host label for `Unknown` nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Kind of the enclosing node, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeKind>,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: NodeKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            label: None,
            parent: None,
            span,
            message: message.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent: Option<NodeKind>) -> Self {
        self.parent = parent;
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(label) = &self.label {
            write!(f, " [{}]", label)?;
        }
        write!(f, " at {}..{}", self.span.start, self.span.end)
    }
}

/// Receives diagnostics from the engine.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Rc<T> {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Logs every diagnostic at `warn` level. The engine's default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!(kind = %diagnostic.kind, "{}", diagnostic);
    }
}

/// Keeps every diagnostic for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Removes and returns the collected diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}
