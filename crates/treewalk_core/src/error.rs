//! Traversal error types.

use thiserror::Error;
use treewalk_ast::{Category, NodeKind};

/// Errors that abort a traversal.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// The caller broke the engine's calling contract (wrong root kind,
    /// re-entrant traversal).
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// A listener callback failed.
    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),
}

impl TraversalError {
    /// Creates a contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }
}

/// Errors returned by listener callbacks.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// A rewrite request was refused.
    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    /// A shared state entry had an unexpected shape.
    #[error("State error: {0}")]
    State(String),

    /// Any other listener failure.
    #[error("{0}")]
    Failed(String),
}

impl ListenerError {
    /// Creates a state error.
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Creates a generic listener failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors raised while recording or applying rewrites.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Replacing a node of one position family with a node of the other
    /// (an expression with a statement, or vice versa).
    #[error("Cannot replace {old_kind} ({old_category:?}) with {new_kind} ({new_category:?})")]
    CategoryMismatch {
        old_kind: NodeKind,
        old_category: Category,
        new_kind: NodeKind,
        new_category: Category,
    },

    /// The sink refused the request.
    #[error("Rewrite rejected: {0}")]
    Rejected(String),
}

impl RewriteError {
    /// Creates a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON or does not match the schema.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_message() {
        let err = TraversalError::contract("root must be a class declaration");
        assert_eq!(
            err.to_string(),
            "Contract violation: root must be a class declaration"
        );
    }

    #[test]
    fn test_rewrite_error_bubbles_through_listener() {
        let err: TraversalError = ListenerError::from(RewriteError::rejected("read-only")).into();

        assert!(matches!(
            err,
            TraversalError::Listener(ListenerError::Rewrite(RewriteError::Rejected(_)))
        ));
        assert_eq!(
            err.to_string(),
            "Listener error: Rewrite error: Rewrite rejected: read-only"
        );
    }

    #[test]
    fn test_category_mismatch_message() {
        let err = RewriteError::CategoryMismatch {
            old_kind: NodeKind::Identifier,
            old_category: Category::Expression,
            new_kind: NodeKind::Block,
            new_category: Category::Statement,
        };
        assert_eq!(
            err.to_string(),
            "Cannot replace IDENTIFIER (Expression) with BLOCK (Statement)"
        );
    }
}
