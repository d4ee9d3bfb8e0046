//! Node kind taxonomy.
//!
//! A closed, fieldless classification of syntax nodes. Listeners are keyed
//! by `NodeKind`, so it is `Copy + Hash` and cheap to use as a map key.

use serde::{Deserialize, Serialize};

/// Kinds of syntax nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NodeKind {
    // Declarations
    /// Class, interface or enum declaration.
    Class,
    /// Method or constructor declaration.
    Method,
    /// Field, local variable, parameter or catch parameter.
    Variable,

    // Statements
    /// `{ ... }`, including static and instance initializer blocks.
    Block,
    If,
    ForLoop,
    EnhancedForLoop,
    WhileLoop,
    DoWhileLoop,
    Try,
    /// One `catch (..) { .. }` clause of a `try`.
    Catch,
    Switch,
    /// One `case`/`default` group of a `switch`.
    Case,
    Return,
    Break,
    Continue,
    Throw,
    ExpressionStatement,
    EmptyStatement,

    // Expressions
    MethodInvocation,
    MemberSelect,
    Identifier,
    Literal,
    Assignment,
    Binary,
    Unary,
    CompoundAssignment,
    TypeCast,
    NewArray,
    NewClass,
    ArrayAccess,
    Parenthesized,

    // Type references
    PrimitiveType,
    ArrayType,
    ParameterizedType,

    /// Anything outside the fixed grammar. Listeners that do not declare a
    /// kind are registered here as well.
    Other,
}

/// Structural category of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Declaration,
    Statement,
    Expression,
    Type,
    Other,
}

impl Category {
    /// Returns true for categories that occupy statement positions.
    #[inline]
    pub const fn is_statement_like(&self) -> bool {
        matches!(self, Category::Declaration | Category::Statement)
    }

    /// Returns true for categories that occupy expression positions.
    #[inline]
    pub const fn is_expression_like(&self) -> bool {
        matches!(self, Category::Expression | Category::Type)
    }
}

impl NodeKind {
    /// All kinds, in declaration order.
    pub const ALL: [NodeKind; 36] = [
        NodeKind::Class,
        NodeKind::Method,
        NodeKind::Variable,
        NodeKind::Block,
        NodeKind::If,
        NodeKind::ForLoop,
        NodeKind::EnhancedForLoop,
        NodeKind::WhileLoop,
        NodeKind::DoWhileLoop,
        NodeKind::Try,
        NodeKind::Catch,
        NodeKind::Switch,
        NodeKind::Case,
        NodeKind::Return,
        NodeKind::Break,
        NodeKind::Continue,
        NodeKind::Throw,
        NodeKind::ExpressionStatement,
        NodeKind::EmptyStatement,
        NodeKind::MethodInvocation,
        NodeKind::MemberSelect,
        NodeKind::Identifier,
        NodeKind::Literal,
        NodeKind::Assignment,
        NodeKind::Binary,
        NodeKind::Unary,
        NodeKind::CompoundAssignment,
        NodeKind::TypeCast,
        NodeKind::NewArray,
        NodeKind::NewClass,
        NodeKind::ArrayAccess,
        NodeKind::Parenthesized,
        NodeKind::PrimitiveType,
        NodeKind::ArrayType,
        NodeKind::ParameterizedType,
        NodeKind::Other,
    ];

    /// Returns the structural category of this kind.
    pub const fn category(&self) -> Category {
        match self {
            NodeKind::Class | NodeKind::Method | NodeKind::Variable => Category::Declaration,
            NodeKind::Block
            | NodeKind::If
            | NodeKind::ForLoop
            | NodeKind::EnhancedForLoop
            | NodeKind::WhileLoop
            | NodeKind::DoWhileLoop
            | NodeKind::Try
            | NodeKind::Catch
            | NodeKind::Switch
            | NodeKind::Case
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Throw
            | NodeKind::ExpressionStatement
            | NodeKind::EmptyStatement => Category::Statement,
            NodeKind::MethodInvocation
            | NodeKind::MemberSelect
            | NodeKind::Identifier
            | NodeKind::Literal
            | NodeKind::Assignment
            | NodeKind::Binary
            | NodeKind::Unary
            | NodeKind::CompoundAssignment
            | NodeKind::TypeCast
            | NodeKind::NewArray
            | NodeKind::NewClass
            | NodeKind::ArrayAccess
            | NodeKind::Parenthesized => Category::Expression,
            NodeKind::PrimitiveType | NodeKind::ArrayType | NodeKind::ParameterizedType => {
                Category::Type
            }
            NodeKind::Other => Category::Other,
        }
    }

    /// Returns the upper snake case name used by javac's `Tree.Kind`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Class => "CLASS",
            NodeKind::Method => "METHOD",
            NodeKind::Variable => "VARIABLE",
            NodeKind::Block => "BLOCK",
            NodeKind::If => "IF",
            NodeKind::ForLoop => "FOR_LOOP",
            NodeKind::EnhancedForLoop => "ENHANCED_FOR_LOOP",
            NodeKind::WhileLoop => "WHILE_LOOP",
            NodeKind::DoWhileLoop => "DO_WHILE_LOOP",
            NodeKind::Try => "TRY",
            NodeKind::Catch => "CATCH",
            NodeKind::Switch => "SWITCH",
            NodeKind::Case => "CASE",
            NodeKind::Return => "RETURN",
            NodeKind::Break => "BREAK",
            NodeKind::Continue => "CONTINUE",
            NodeKind::Throw => "THROW",
            NodeKind::ExpressionStatement => "EXPRESSION_STATEMENT",
            NodeKind::EmptyStatement => "EMPTY_STATEMENT",
            NodeKind::MethodInvocation => "METHOD_INVOCATION",
            NodeKind::MemberSelect => "MEMBER_SELECT",
            NodeKind::Identifier => "IDENTIFIER",
            NodeKind::Literal => "LITERAL",
            NodeKind::Assignment => "ASSIGNMENT",
            NodeKind::Binary => "BINARY",
            NodeKind::Unary => "UNARY",
            NodeKind::CompoundAssignment => "COMPOUND_ASSIGNMENT",
            NodeKind::TypeCast => "TYPE_CAST",
            NodeKind::NewArray => "NEW_ARRAY",
            NodeKind::NewClass => "NEW_CLASS",
            NodeKind::ArrayAccess => "ARRAY_ACCESS",
            NodeKind::Parenthesized => "PARENTHESIZED",
            NodeKind::PrimitiveType => "PRIMITIVE_TYPE",
            NodeKind::ArrayType => "ARRAY_TYPE",
            NodeKind::ParameterizedType => "PARAMETERIZED_TYPE",
            NodeKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
