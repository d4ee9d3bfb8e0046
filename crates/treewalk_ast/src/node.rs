//! JavaNode definition.
//!
//! The core tree node type. Every variant of [`NodeData`] carries the typed
//! children appropriate to its kind, so walkers match exhaustively instead of
//! down-casting.

use serde::Serialize;

use crate::{AstArena, Category, NodeKind, Span};

/// Reference to an arena-allocated node.
pub type NodeRef<'a> = &'a JavaNode<'a>;

/// Arena-allocated list of child nodes.
pub type NodeList<'a> = &'a [&'a JavaNode<'a>];

/// Identity of a node: its address in the arena.
///
/// Two nodes are "the same node" only when their ids are equal; structural
/// equality is never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw address value.
    #[inline]
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

/// A node in the syntax tree.
///
/// Nodes are allocated in an [`AstArena`] and never mutated. Rewriting a
/// subtree means allocating new nodes; see `treewalk_core::RewriteBatch`.
///
/// # Example
///
/// ```rust
/// use treewalk_ast::{AstArena, JavaNode, NodeData, NodeKind, Span};
///
/// let arena = AstArena::new();
/// let name = arena.alloc_node(JavaNode::new(Span::new(0, 1), NodeData::Identifier { name: "x" }));
///
/// assert_eq!(name.kind(), NodeKind::Identifier);
/// assert_eq!(name.qualified_name().as_deref(), Some("x"));
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JavaNode<'a> {
    /// Byte span in the source text.
    pub span: Span,

    /// Kind-specific payload and children.
    #[serde(flatten)]
    pub data: NodeData<'a>,
}

/// Kind-specific payload of a [`JavaNode`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type")]
pub enum NodeData<'a> {
    Class {
        name: &'a str,
        members: NodeList<'a>,
    },
    Method {
        name: &'a str,
        parameters: NodeList<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        return_type: Option<NodeRef<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<NodeRef<'a>>,
    },
    Variable {
        name: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        var_type: Option<NodeRef<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        initializer: Option<NodeRef<'a>>,
    },
    Block {
        is_static: bool,
        statements: NodeList<'a>,
    },
    If {
        condition: NodeRef<'a>,
        then_branch: NodeRef<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        else_branch: Option<NodeRef<'a>>,
    },
    ForLoop {
        initializers: NodeList<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        condition: Option<NodeRef<'a>>,
        updates: NodeList<'a>,
        body: NodeRef<'a>,
    },
    EnhancedForLoop {
        variable: NodeRef<'a>,
        expression: NodeRef<'a>,
        body: NodeRef<'a>,
    },
    WhileLoop {
        condition: NodeRef<'a>,
        body: NodeRef<'a>,
    },
    DoWhileLoop {
        body: NodeRef<'a>,
        condition: NodeRef<'a>,
    },
    Try {
        block: NodeRef<'a>,
        catches: NodeList<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        finally: Option<NodeRef<'a>>,
    },
    Catch {
        parameter: NodeRef<'a>,
        block: NodeRef<'a>,
    },
    Switch {
        selector: NodeRef<'a>,
        cases: NodeList<'a>,
    },
    Case {
        /// `None` for `default:`.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<NodeRef<'a>>,
        statements: NodeList<'a>,
    },
    Return {
        #[serde(skip_serializing_if = "Option::is_none")]
        expression: Option<NodeRef<'a>>,
    },
    Break {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<&'a str>,
    },
    Continue {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<&'a str>,
    },
    Throw {
        expression: NodeRef<'a>,
    },
    ExpressionStatement {
        expression: NodeRef<'a>,
    },
    EmptyStatement,
    MethodInvocation {
        method_select: NodeRef<'a>,
        type_arguments: NodeList<'a>,
        arguments: NodeList<'a>,
    },
    MemberSelect {
        expression: NodeRef<'a>,
        identifier: &'a str,
    },
    Identifier {
        name: &'a str,
    },
    Literal {
        value: LiteralValue<'a>,
    },
    Assignment {
        variable: NodeRef<'a>,
        expression: NodeRef<'a>,
    },
    Binary {
        operator: BinaryOperator,
        left: NodeRef<'a>,
        right: NodeRef<'a>,
    },
    Unary {
        operator: UnaryOperator,
        operand: NodeRef<'a>,
    },
    CompoundAssignment {
        operator: BinaryOperator,
        variable: NodeRef<'a>,
        expression: NodeRef<'a>,
    },
    TypeCast {
        target_type: NodeRef<'a>,
        expression: NodeRef<'a>,
    },
    NewArray {
        #[serde(skip_serializing_if = "Option::is_none")]
        element_type: Option<NodeRef<'a>>,
        dimensions: NodeList<'a>,
        initializers: NodeList<'a>,
    },
    NewClass {
        #[serde(skip_serializing_if = "Option::is_none")]
        enclosing: Option<NodeRef<'a>>,
        identifier: NodeRef<'a>,
        type_arguments: NodeList<'a>,
        arguments: NodeList<'a>,
        /// Anonymous class body.
        #[serde(skip_serializing_if = "Option::is_none")]
        class_body: Option<NodeRef<'a>>,
    },
    ArrayAccess {
        expression: NodeRef<'a>,
        index: NodeRef<'a>,
    },
    Parenthesized {
        expression: NodeRef<'a>,
    },
    PrimitiveType {
        primitive: PrimitiveKind,
    },
    ArrayType {
        element: NodeRef<'a>,
    },
    ParameterizedType {
        base: NodeRef<'a>,
        arguments: NodeList<'a>,
    },
    /// A host construct the fixed grammar does not model (lambdas,
    /// annotations, ...). `label` is the host's own name for it.
    Unknown {
        label: &'a str,
        children: NodeList<'a>,
    },
}

/// Value of a literal expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "literal", content = "value", rename_all = "lowercase")]
pub enum LiteralValue<'a> {
    String(&'a str),
    Char(char),
    Int(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    Boolean(bool),
    Null,
}

/// Binary and compound-assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualTo,
    NotEqualTo,
    And,
    Xor,
    Or,
    ConditionalAnd,
    ConditionalOr,
}

impl BinaryOperator {
    /// Returns the source symbol of the operator.
    pub const fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::EqualTo => "==",
            BinaryOperator::NotEqualTo => "!=",
            BinaryOperator::And => "&",
            BinaryOperator::Xor => "^",
            BinaryOperator::Or => "|",
            BinaryOperator::ConditionalAnd => "&&",
            BinaryOperator::ConditionalOr => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
    Plus,
    Minus,
    BitwiseComplement,
    LogicalComplement,
}

/// Primitive type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    /// Returns the source keyword.
    pub const fn keyword(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }
}

impl<'a> JavaNode<'a> {
    /// Creates a node. Allocate it with [`AstArena::alloc_node`] to give it
    /// an identity.
    #[inline]
    pub const fn new(span: Span, data: NodeData<'a>) -> Self {
        Self { span, data }
    }

    /// Returns the kind of this node.
    #[inline]
    pub const fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Returns the structural category of this node.
    #[inline]
    pub const fn category(&self) -> Category {
        self.kind().category()
    }

    /// Returns the identity of this node.
    #[inline]
    pub fn id(&self) -> NodeId {
        NodeId(self as *const JavaNode<'a> as usize)
    }

    /// Identity comparison.
    #[inline]
    pub fn same_as(&self, other: &JavaNode<'_>) -> bool {
        std::ptr::eq(
            self as *const JavaNode<'a> as *const u8,
            other as *const JavaNode<'_> as *const u8,
        )
    }

    /// Declared name of a class, method or variable, or the name of an
    /// identifier.
    pub fn name(&self) -> Option<&'a str> {
        match self.data {
            NodeData::Class { name, .. }
            | NodeData::Method { name, .. }
            | NodeData::Variable { name, .. }
            | NodeData::Identifier { name } => Some(name),
            NodeData::MemberSelect { identifier, .. } => Some(identifier),
            _ => None,
        }
    }

    /// Dotted name of an identifier or member-select chain, e.g.
    /// `System.out.println`. Returns `None` when the chain contains anything
    /// other than identifiers and member selects.
    pub fn qualified_name(&self) -> Option<String> {
        match self.data {
            NodeData::Identifier { name } => Some(name.to_string()),
            NodeData::MemberSelect {
                expression,
                identifier,
            } => {
                let mut qualified = expression.qualified_name()?;
                qualified.push('.');
                qualified.push_str(identifier);
                Some(qualified)
            }
            _ => None,
        }
    }

    /// Returns the string value of a string literal.
    pub fn as_string_literal(&self) -> Option<&'a str> {
        match self.data {
            NodeData::Literal {
                value: LiteralValue::String(value),
            } => Some(value),
            _ => None,
        }
    }

    /// Statements of a block, or of a `case` group.
    pub fn statements(&self) -> Option<NodeList<'a>> {
        match self.data {
            NodeData::Block { statements, .. } | NodeData::Case { statements, .. } => {
                Some(statements)
            }
            _ => None,
        }
    }

    /// Position of `statement` (by identity) among this node's statements.
    pub fn statement_index(&self, statement: &JavaNode<'_>) -> Option<usize> {
        self.statements()?
            .iter()
            .position(|candidate| candidate.same_as(statement))
    }

    /// Direct children in source order.
    ///
    /// This is the order children appear in the source text, which is not
    /// necessarily the order in which a walker visits them.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        let _ = self.for_each_child(|child| {
            out.push(child);
            Ok::<_, std::convert::Infallible>(child)
        });
        out
    }

    /// Rebuilds this node with every direct child passed through `f`.
    ///
    /// Returns `Ok(None)` when `f` returned every child unchanged (by
    /// identity), in which case nothing is allocated. Otherwise returns the
    /// new node, with the original span, ready to be allocated.
    pub fn map_children<E, F>(&self, arena: &'a AstArena, mut f: F) -> Result<Option<JavaNode<'a>>, E>
    where
        F: FnMut(NodeRef<'a>) -> Result<NodeRef<'a>, E>,
    {
        let mut mapper = ChildMapper {
            arena: Some(arena),
            f: &mut f,
            changed: false,
        };
        let data = mapper.map(self.data)?;
        Ok(mapper.changed.then(|| JavaNode::new(self.span, data)))
    }

    fn for_each_child<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(NodeRef<'a>) -> Result<NodeRef<'a>, E>,
    {
        let mut mapper = ChildMapper {
            arena: None,
            f: &mut f,
            changed: false,
        };
        mapper.map(self.data).map(|_| ())
    }
}

impl<'a> NodeData<'a> {
    /// Returns the kind of this payload.
    pub const fn kind(&self) -> NodeKind {
        match self {
            NodeData::Class { .. } => NodeKind::Class,
            NodeData::Method { .. } => NodeKind::Method,
            NodeData::Variable { .. } => NodeKind::Variable,
            NodeData::Block { .. } => NodeKind::Block,
            NodeData::If { .. } => NodeKind::If,
            NodeData::ForLoop { .. } => NodeKind::ForLoop,
            NodeData::EnhancedForLoop { .. } => NodeKind::EnhancedForLoop,
            NodeData::WhileLoop { .. } => NodeKind::WhileLoop,
            NodeData::DoWhileLoop { .. } => NodeKind::DoWhileLoop,
            NodeData::Try { .. } => NodeKind::Try,
            NodeData::Catch { .. } => NodeKind::Catch,
            NodeData::Switch { .. } => NodeKind::Switch,
            NodeData::Case { .. } => NodeKind::Case,
            NodeData::Return { .. } => NodeKind::Return,
            NodeData::Break { .. } => NodeKind::Break,
            NodeData::Continue { .. } => NodeKind::Continue,
            NodeData::Throw { .. } => NodeKind::Throw,
            NodeData::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NodeData::EmptyStatement => NodeKind::EmptyStatement,
            NodeData::MethodInvocation { .. } => NodeKind::MethodInvocation,
            NodeData::MemberSelect { .. } => NodeKind::MemberSelect,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::Literal { .. } => NodeKind::Literal,
            NodeData::Assignment { .. } => NodeKind::Assignment,
            NodeData::Binary { .. } => NodeKind::Binary,
            NodeData::Unary { .. } => NodeKind::Unary,
            NodeData::CompoundAssignment { .. } => NodeKind::CompoundAssignment,
            NodeData::TypeCast { .. } => NodeKind::TypeCast,
            NodeData::NewArray { .. } => NodeKind::NewArray,
            NodeData::NewClass { .. } => NodeKind::NewClass,
            NodeData::ArrayAccess { .. } => NodeKind::ArrayAccess,
            NodeData::Parenthesized { .. } => NodeKind::Parenthesized,
            NodeData::PrimitiveType { .. } => NodeKind::PrimitiveType,
            NodeData::ArrayType { .. } => NodeKind::ArrayType,
            NodeData::ParameterizedType { .. } => NodeKind::ParameterizedType,
            NodeData::Unknown { .. } => NodeKind::Other,
        }
    }
}

/// Passes every child of a payload through a callback, rebuilding child
/// lists in the arena only when one of their entries changed.
struct ChildMapper<'a, 'f, E> {
    /// `None` when only visiting; lists are then never reallocated.
    arena: Option<&'a AstArena>,
    f: &'f mut dyn FnMut(NodeRef<'a>) -> Result<NodeRef<'a>, E>,
    changed: bool,
}

impl<'a, E> ChildMapper<'a, '_, E> {
    fn one(&mut self, node: NodeRef<'a>) -> Result<NodeRef<'a>, E> {
        let mapped = (self.f)(node)?;
        if !mapped.same_as(node) {
            self.changed = true;
        }
        Ok(mapped)
    }

    fn opt(&mut self, node: Option<NodeRef<'a>>) -> Result<Option<NodeRef<'a>>, E> {
        node.map(|node| self.one(node)).transpose()
    }

    fn list(&mut self, nodes: NodeList<'a>) -> Result<NodeList<'a>, E> {
        let changed_before = std::mem::replace(&mut self.changed, false);
        let mut mapped = Vec::with_capacity(nodes.len());
        for node in nodes {
            mapped.push(self.one(node)?);
        }
        let list = match self.arena {
            Some(arena) if self.changed => arena.alloc_nodes(&mapped),
            _ => nodes,
        };
        self.changed |= changed_before;
        Ok(list)
    }

    fn map(&mut self, data: NodeData<'a>) -> Result<NodeData<'a>, E> {
        let mapped = match data {
            NodeData::Class { name, members } => NodeData::Class {
                name,
                members: self.list(members)?,
            },
            NodeData::Method {
                name,
                parameters,
                return_type,
                body,
            } => NodeData::Method {
                name,
                return_type: self.opt(return_type)?,
                parameters: self.list(parameters)?,
                body: self.opt(body)?,
            },
            NodeData::Variable {
                name,
                var_type,
                initializer,
            } => NodeData::Variable {
                name,
                var_type: self.opt(var_type)?,
                initializer: self.opt(initializer)?,
            },
            NodeData::Block {
                is_static,
                statements,
            } => NodeData::Block {
                is_static,
                statements: self.list(statements)?,
            },
            NodeData::If {
                condition,
                then_branch,
                else_branch,
            } => NodeData::If {
                condition: self.one(condition)?,
                then_branch: self.one(then_branch)?,
                else_branch: self.opt(else_branch)?,
            },
            NodeData::ForLoop {
                initializers,
                condition,
                updates,
                body,
            } => NodeData::ForLoop {
                initializers: self.list(initializers)?,
                condition: self.opt(condition)?,
                updates: self.list(updates)?,
                body: self.one(body)?,
            },
            NodeData::EnhancedForLoop {
                variable,
                expression,
                body,
            } => NodeData::EnhancedForLoop {
                variable: self.one(variable)?,
                expression: self.one(expression)?,
                body: self.one(body)?,
            },
            NodeData::WhileLoop { condition, body } => NodeData::WhileLoop {
                condition: self.one(condition)?,
                body: self.one(body)?,
            },
            NodeData::DoWhileLoop { body, condition } => NodeData::DoWhileLoop {
                body: self.one(body)?,
                condition: self.one(condition)?,
            },
            NodeData::Try {
                block,
                catches,
                finally,
            } => NodeData::Try {
                block: self.one(block)?,
                catches: self.list(catches)?,
                finally: self.opt(finally)?,
            },
            NodeData::Catch { parameter, block } => NodeData::Catch {
                parameter: self.one(parameter)?,
                block: self.one(block)?,
            },
            NodeData::Switch { selector, cases } => NodeData::Switch {
                selector: self.one(selector)?,
                cases: self.list(cases)?,
            },
            NodeData::Case { label, statements } => NodeData::Case {
                label: self.opt(label)?,
                statements: self.list(statements)?,
            },
            NodeData::Return { expression } => NodeData::Return {
                expression: self.opt(expression)?,
            },
            NodeData::Throw { expression } => NodeData::Throw {
                expression: self.one(expression)?,
            },
            NodeData::ExpressionStatement { expression } => NodeData::ExpressionStatement {
                expression: self.one(expression)?,
            },
            NodeData::MethodInvocation {
                method_select,
                type_arguments,
                arguments,
            } => NodeData::MethodInvocation {
                type_arguments: self.list(type_arguments)?,
                method_select: self.one(method_select)?,
                arguments: self.list(arguments)?,
            },
            NodeData::MemberSelect {
                expression,
                identifier,
            } => NodeData::MemberSelect {
                expression: self.one(expression)?,
                identifier,
            },
            NodeData::Assignment {
                variable,
                expression,
            } => NodeData::Assignment {
                variable: self.one(variable)?,
                expression: self.one(expression)?,
            },
            NodeData::Binary {
                operator,
                left,
                right,
            } => NodeData::Binary {
                operator,
                left: self.one(left)?,
                right: self.one(right)?,
            },
            NodeData::Unary { operator, operand } => NodeData::Unary {
                operator,
                operand: self.one(operand)?,
            },
            NodeData::CompoundAssignment {
                operator,
                variable,
                expression,
            } => NodeData::CompoundAssignment {
                operator,
                variable: self.one(variable)?,
                expression: self.one(expression)?,
            },
            NodeData::TypeCast {
                target_type,
                expression,
            } => NodeData::TypeCast {
                target_type: self.one(target_type)?,
                expression: self.one(expression)?,
            },
            NodeData::NewArray {
                element_type,
                dimensions,
                initializers,
            } => NodeData::NewArray {
                element_type: self.opt(element_type)?,
                dimensions: self.list(dimensions)?,
                initializers: self.list(initializers)?,
            },
            NodeData::NewClass {
                enclosing,
                identifier,
                type_arguments,
                arguments,
                class_body,
            } => NodeData::NewClass {
                enclosing: self.opt(enclosing)?,
                identifier: self.one(identifier)?,
                type_arguments: self.list(type_arguments)?,
                arguments: self.list(arguments)?,
                class_body: self.opt(class_body)?,
            },
            NodeData::ArrayAccess { expression, index } => NodeData::ArrayAccess {
                expression: self.one(expression)?,
                index: self.one(index)?,
            },
            NodeData::Parenthesized { expression } => NodeData::Parenthesized {
                expression: self.one(expression)?,
            },
            NodeData::ArrayType { element } => NodeData::ArrayType {
                element: self.one(element)?,
            },
            NodeData::ParameterizedType { base, arguments } => NodeData::ParameterizedType {
                base: self.one(base)?,
                arguments: self.list(arguments)?,
            },
            NodeData::Unknown { label, children } => NodeData::Unknown {
                label,
                children: self.list(children)?,
            },
            leaf @ (NodeData::Break { .. }
            | NodeData::Continue { .. }
            | NodeData::EmptyStatement
            | NodeData::Identifier { .. }
            | NodeData::Literal { .. }
            | NodeData::PrimitiveType { .. }) => leaf,
        };
        Ok(mapped)
    }
}
