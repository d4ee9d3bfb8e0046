//! Node factory.
//!
//! Listeners that rewrite the tree build their replacement nodes with a
//! [`TreeMaker`]. Every node it creates is allocated in the arena of the tree
//! being rewritten and carries [`Span::empty`].

use crate::{
    AstArena, BinaryOperator, JavaNode, LiteralValue, NodeData, NodeList, NodeRef, PrimitiveKind,
    Span, UnaryOperator,
};

/// Builds arena-allocated nodes.
#[derive(Clone, Copy)]
pub struct TreeMaker<'a> {
    arena: &'a AstArena,
}

impl<'a> TreeMaker<'a> {
    pub fn new(arena: &'a AstArena) -> Self {
        Self { arena }
    }

    /// Returns the arena nodes are allocated in.
    pub fn arena(&self) -> &'a AstArena {
        self.arena
    }

    fn node(&self, data: NodeData<'a>) -> NodeRef<'a> {
        self.arena.alloc_node(JavaNode::new(Span::empty(), data))
    }

    fn list(&self, nodes: &[NodeRef<'a>]) -> NodeList<'a> {
        self.arena.alloc_nodes(nodes)
    }

    fn text(&self, s: &str) -> &'a str {
        self.arena.alloc_str(s)
    }

    // Declarations

    pub fn class(&self, name: &str, members: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeData::Class {
            name: self.text(name),
            members: self.list(members),
        })
    }

    pub fn method(
        &self,
        name: &str,
        parameters: &[NodeRef<'a>],
        return_type: Option<NodeRef<'a>>,
        body: Option<NodeRef<'a>>,
    ) -> NodeRef<'a> {
        self.node(NodeData::Method {
            name: self.text(name),
            parameters: self.list(parameters),
            return_type,
            body,
        })
    }

    pub fn variable(
        &self,
        name: &str,
        var_type: Option<NodeRef<'a>>,
        initializer: Option<NodeRef<'a>>,
    ) -> NodeRef<'a> {
        self.node(NodeData::Variable {
            name: self.text(name),
            var_type,
            initializer,
        })
    }

    // Statements

    pub fn block(&self, statements: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeData::Block {
            is_static: false,
            statements: self.list(statements),
        })
    }

    pub fn static_block(&self, statements: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeData::Block {
            is_static: true,
            statements: self.list(statements),
        })
    }

    pub fn if_statement(
        &self,
        condition: NodeRef<'a>,
        then_branch: NodeRef<'a>,
        else_branch: Option<NodeRef<'a>>,
    ) -> NodeRef<'a> {
        self.node(NodeData::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn for_loop(
        &self,
        initializers: &[NodeRef<'a>],
        condition: Option<NodeRef<'a>>,
        updates: &[NodeRef<'a>],
        body: NodeRef<'a>,
    ) -> NodeRef<'a> {
        self.node(NodeData::ForLoop {
            initializers: self.list(initializers),
            condition,
            updates: self.list(updates),
            body,
        })
    }

    pub fn enhanced_for_loop(
        &self,
        variable: NodeRef<'a>,
        expression: NodeRef<'a>,
        body: NodeRef<'a>,
    ) -> NodeRef<'a> {
        self.node(NodeData::EnhancedForLoop {
            variable,
            expression,
            body,
        })
    }

    pub fn while_loop(&self, condition: NodeRef<'a>, body: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::WhileLoop { condition, body })
    }

    pub fn do_while_loop(&self, body: NodeRef<'a>, condition: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::DoWhileLoop { body, condition })
    }

    pub fn try_statement(
        &self,
        block: NodeRef<'a>,
        catches: &[NodeRef<'a>],
        finally: Option<NodeRef<'a>>,
    ) -> NodeRef<'a> {
        self.node(NodeData::Try {
            block,
            catches: self.list(catches),
            finally,
        })
    }

    pub fn catch(&self, parameter: NodeRef<'a>, block: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::Catch { parameter, block })
    }

    pub fn switch(&self, selector: NodeRef<'a>, cases: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeData::Switch {
            selector,
            cases: self.list(cases),
        })
    }

    /// A `case` group; `label: None` is `default:`.
    pub fn case(&self, label: Option<NodeRef<'a>>, statements: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeData::Case {
            label,
            statements: self.list(statements),
        })
    }

    pub fn return_statement(&self, expression: Option<NodeRef<'a>>) -> NodeRef<'a> {
        self.node(NodeData::Return { expression })
    }

    pub fn break_statement(&self, label: Option<&str>) -> NodeRef<'a> {
        self.node(NodeData::Break {
            label: label.map(|l| self.text(l)),
        })
    }

    pub fn continue_statement(&self, label: Option<&str>) -> NodeRef<'a> {
        self.node(NodeData::Continue {
            label: label.map(|l| self.text(l)),
        })
    }

    pub fn throw_statement(&self, expression: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::Throw { expression })
    }

    pub fn expression_statement(&self, expression: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::ExpressionStatement { expression })
    }

    pub fn empty_statement(&self) -> NodeRef<'a> {
        self.node(NodeData::EmptyStatement)
    }

    // Expressions

    pub fn invocation(&self, method_select: NodeRef<'a>, arguments: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.generic_invocation(method_select, &[], arguments)
    }

    pub fn generic_invocation(
        &self,
        method_select: NodeRef<'a>,
        type_arguments: &[NodeRef<'a>],
        arguments: &[NodeRef<'a>],
    ) -> NodeRef<'a> {
        self.node(NodeData::MethodInvocation {
            method_select,
            type_arguments: self.list(type_arguments),
            arguments: self.list(arguments),
        })
    }

    pub fn member_select(&self, expression: NodeRef<'a>, identifier: &str) -> NodeRef<'a> {
        self.node(NodeData::MemberSelect {
            expression,
            identifier: self.text(identifier),
        })
    }

    pub fn identifier(&self, name: &str) -> NodeRef<'a> {
        self.node(NodeData::Identifier {
            name: self.text(name),
        })
    }

    /// Builds the identifier/member-select chain for a dotted name.
    ///
    /// `"java.util.logging.Logger"` becomes
    /// `MemberSelect(MemberSelect(MemberSelect(Identifier(java), util), logging), Logger)`;
    /// a name without dots becomes a plain identifier.
    pub fn qualified_name(&self, dotted: &str) -> NodeRef<'a> {
        let mut segments = dotted.split('.');
        let first = segments.next().unwrap_or_default();
        segments.fold(self.identifier(first), |receiver, segment| {
            self.member_select(receiver, segment)
        })
    }

    pub fn literal(&self, value: LiteralValue<'_>) -> NodeRef<'a> {
        let value = match value {
            LiteralValue::String(s) => LiteralValue::String(self.text(s)),
            LiteralValue::Char(c) => LiteralValue::Char(c),
            LiteralValue::Int(v) => LiteralValue::Int(v),
            LiteralValue::Long(v) => LiteralValue::Long(v),
            LiteralValue::Float(v) => LiteralValue::Float(v),
            LiteralValue::Double(v) => LiteralValue::Double(v),
            LiteralValue::Boolean(v) => LiteralValue::Boolean(v),
            LiteralValue::Null => LiteralValue::Null,
        };
        self.node(NodeData::Literal { value })
    }

    pub fn string_literal(&self, value: &str) -> NodeRef<'a> {
        self.literal(LiteralValue::String(value))
    }

    pub fn assignment(&self, variable: NodeRef<'a>, expression: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::Assignment {
            variable,
            expression,
        })
    }

    pub fn binary(
        &self,
        operator: BinaryOperator,
        left: NodeRef<'a>,
        right: NodeRef<'a>,
    ) -> NodeRef<'a> {
        self.node(NodeData::Binary {
            operator,
            left,
            right,
        })
    }

    pub fn unary(&self, operator: UnaryOperator, operand: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::Unary { operator, operand })
    }

    pub fn compound_assignment(
        &self,
        operator: BinaryOperator,
        variable: NodeRef<'a>,
        expression: NodeRef<'a>,
    ) -> NodeRef<'a> {
        self.node(NodeData::CompoundAssignment {
            operator,
            variable,
            expression,
        })
    }

    pub fn type_cast(&self, target_type: NodeRef<'a>, expression: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::TypeCast {
            target_type,
            expression,
        })
    }

    pub fn new_array(
        &self,
        element_type: Option<NodeRef<'a>>,
        dimensions: &[NodeRef<'a>],
        initializers: &[NodeRef<'a>],
    ) -> NodeRef<'a> {
        self.node(NodeData::NewArray {
            element_type,
            dimensions: self.list(dimensions),
            initializers: self.list(initializers),
        })
    }

    pub fn new_class(
        &self,
        identifier: NodeRef<'a>,
        arguments: &[NodeRef<'a>],
        class_body: Option<NodeRef<'a>>,
    ) -> NodeRef<'a> {
        self.node(NodeData::NewClass {
            enclosing: None,
            identifier,
            type_arguments: &[],
            arguments: self.list(arguments),
            class_body,
        })
    }

    pub fn array_access(&self, expression: NodeRef<'a>, index: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::ArrayAccess { expression, index })
    }

    pub fn parenthesized(&self, expression: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::Parenthesized { expression })
    }

    // Types

    pub fn primitive_type(&self, primitive: PrimitiveKind) -> NodeRef<'a> {
        self.node(NodeData::PrimitiveType { primitive })
    }

    pub fn array_type(&self, element: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeData::ArrayType { element })
    }

    pub fn parameterized_type(&self, base: NodeRef<'a>, arguments: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeData::ParameterizedType {
            base,
            arguments: self.list(arguments),
        })
    }

    /// A host construct outside the fixed grammar.
    pub fn unknown(&self, label: &str, children: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeData::Unknown {
            label: self.text(label),
            children: self.list(children),
        })
    }

    // Editing helpers. These never touch `target`; they return a copy.

    /// Copy of a block or class with `statement` inserted at `index`
    /// (clamped to the end). Returns `None` for other kinds.
    pub fn insert_into(
        &self,
        target: NodeRef<'a>,
        index: usize,
        statement: NodeRef<'a>,
    ) -> Option<NodeRef<'a>> {
        self.edit_list(target, |items| {
            let index = index.min(items.len());
            items.insert(index, statement);
        })
    }

    /// Copy of a block or class with `statement` appended.
    pub fn append_to(&self, target: NodeRef<'a>, statement: NodeRef<'a>) -> Option<NodeRef<'a>> {
        self.edit_list(target, |items| items.push(statement))
    }

    /// Copy of a block or class with the entry identical to `old` replaced
    /// by the given nodes (possibly none). Returns `None` when `target` has
    /// no such entry.
    pub fn splice(
        &self,
        target: NodeRef<'a>,
        old: &JavaNode<'_>,
        replacement: &[NodeRef<'a>],
    ) -> Option<NodeRef<'a>> {
        let position = list_of(target)?.iter().position(|item| item.same_as(old))?;
        self.edit_list(target, |items| {
            items.splice(position..=position, replacement.iter().copied());
        })
    }

    fn edit_list(
        &self,
        target: NodeRef<'a>,
        edit: impl FnOnce(&mut Vec<NodeRef<'a>>),
    ) -> Option<NodeRef<'a>> {
        let mut items = list_of(target)?.to_vec();
        edit(&mut items);
        let items = self.list(&items);
        let data = match target.data {
            NodeData::Block { is_static, .. } => NodeData::Block {
                is_static,
                statements: items,
            },
            NodeData::Class { name, .. } => NodeData::Class {
                name,
                members: items,
            },
            _ => return None,
        };
        Some(self.arena.alloc_node(JavaNode::new(target.span, data)))
    }
}

fn list_of<'a>(node: NodeRef<'a>) -> Option<NodeList<'a>> {
    match node.data {
        NodeData::Block { statements, .. } => Some(statements),
        NodeData::Class { members, .. } => Some(members),
        _ => None,
    }
}
