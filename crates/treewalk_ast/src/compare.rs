//! Ordering of member declarations by signature.
//!
//! Listeners that insert members (a logger field, a generated method) use
//! these to find an existing declaration with the same signature, or to keep
//! generated members sorted.

use std::cmp::Ordering;

use crate::{JavaNode, NodeData};

/// Simple name of a type reference: `java.util.List<String>[]` yields
/// `List`. Returns `None` for nodes that are not type references.
pub fn type_simple_name<'a>(node: &JavaNode<'a>) -> Option<&'a str> {
    match node.data {
        NodeData::Identifier { name } => Some(name),
        NodeData::MemberSelect { identifier, .. } => Some(identifier),
        NodeData::ArrayType { element } => type_simple_name(element),
        NodeData::ParameterizedType { base, .. } => type_simple_name(base),
        NodeData::PrimitiveType { primitive } => Some(primitive.keyword()),
        _ => None,
    }
}

/// Orders two variable declarations by type simple name, then by name.
///
/// Non-variables sort after variables.
pub fn compare_variables(left: &JavaNode<'_>, right: &JavaNode<'_>) -> Ordering {
    match (variable_key(left), variable_key(right)) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders two method declarations by name, then parameter count, then the
/// parameters pairwise with [`compare_variables`] on their types.
///
/// Parameter names are ignored, so `Ordering::Equal` means "same signature".
pub fn compare_methods(left: &JavaNode<'_>, right: &JavaNode<'_>) -> Ordering {
    let (
        NodeData::Method {
            name: left_name,
            parameters: left_params,
            ..
        },
        NodeData::Method {
            name: right_name,
            parameters: right_params,
            ..
        },
    ) = (left.data, right.data)
    else {
        return left.kind().cmp(&right.kind());
    };

    left_name
        .cmp(&right_name)
        .then_with(|| left_params.len().cmp(&right_params.len()))
        .then_with(|| {
            left_params
                .iter()
                .zip(right_params.iter())
                .map(|(l, r)| parameter_type(l).cmp(&parameter_type(r)))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

fn variable_key<'a>(node: &JavaNode<'a>) -> Option<(Option<&'a str>, &'a str)> {
    match node.data {
        NodeData::Variable { name, var_type, .. } => {
            Some((var_type.and_then(type_simple_name), name))
        }
        _ => None,
    }
}

fn parameter_type<'a>(node: &JavaNode<'a>) -> Option<&'a str> {
    variable_key(node).and_then(|(var_type, _)| var_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AstArena, PrimitiveKind, TreeMaker};
    use rstest::rstest;

    #[rstest]
    #[case::identifier("String", "String")]
    #[case::qualified("java.util.logging.Logger", "Logger")]
    fn test_type_simple_name(#[case] dotted: &str, #[case] expected: &str) {
        let arena = AstArena::new();
        let make = TreeMaker::new(&arena);
        assert_eq!(type_simple_name(make.qualified_name(dotted)), Some(expected));
    }

    #[test]
    fn test_type_simple_name_unwraps_arrays_and_generics() {
        let arena = AstArena::new();
        let make = TreeMaker::new(&arena);
        let list = make.parameterized_type(
            make.qualified_name("java.util.List"),
            &[make.identifier("String")],
        );
        let array = make.array_type(list);

        assert_eq!(type_simple_name(array), Some("List"));
        assert_eq!(
            type_simple_name(make.primitive_type(PrimitiveKind::Int)),
            Some("int")
        );
        assert_eq!(type_simple_name(make.string_literal("x")), None);
    }

    #[test]
    fn test_methods_with_same_signature_are_equal() {
        let arena = AstArena::new();
        let make = TreeMaker::new(&arena);
        let left = make.method(
            "log",
            &[make.variable("message", Some(make.identifier("String")), None)],
            None,
            None,
        );
        let right = make.method(
            "log",
            &[make.variable("text", Some(make.qualified_name("java.lang.String")), None)],
            None,
            None,
        );

        assert_eq!(compare_methods(left, right), Ordering::Equal);
    }

    #[test]
    fn test_methods_order_by_name_then_arity() {
        let arena = AstArena::new();
        let make = TreeMaker::new(&arena);
        let param = make.variable("a", Some(make.identifier("int")), None);
        let alpha = make.method("alpha", &[param], None, None);
        let beta = make.method("beta", &[], None, None);
        let beta_one = make.method("beta", &[param], None, None);

        assert_eq!(compare_methods(alpha, beta), Ordering::Less);
        assert_eq!(compare_methods(beta, beta_one), Ordering::Less);
        assert_eq!(compare_methods(beta_one, beta), Ordering::Greater);
    }

    #[test]
    fn test_variables_sort_before_other_nodes() {
        let arena = AstArena::new();
        let make = TreeMaker::new(&arena);
        let field = make.variable("LOGGER", Some(make.identifier("Logger")), None);
        let block = make.block(&[]);

        assert_eq!(compare_variables(field, block), Ordering::Less);
        assert_eq!(compare_variables(block, field), Ordering::Greater);
        assert_eq!(compare_variables(field, field), Ordering::Equal);
    }
}
