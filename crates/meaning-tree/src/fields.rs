//! Uniform view over the child-bearing fields of every node kind.
//!
//! Generic algorithms (traversal, export, id refresh) go through
//! [`Node::fields`] and never match on concrete kinds, so a new kind only has
//! to declare its fields here.

use crate::node::{Node, NodeKind};
use std::fmt;

/// Shape of one child-bearing field.
#[derive(Debug, Clone, Copy)]
pub enum FieldShape<'a> {
    /// Zero or one child.
    Single(Option<&'a Node>),
    /// Ordered children whose count is fixed when the node is built.
    Fixed(&'a [Node]),
    /// Ordered, growable children.
    Dynamic(&'a [Node]),
}

/// One declared field of a concrete node.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor<'a> {
    name: &'static str,
    shape: FieldShape<'a>,
}

impl<'a> FieldDescriptor<'a> {
    fn single(name: &'static str, node: &'a Node) -> Self {
        Self {
            name,
            shape: FieldShape::Single(Some(node)),
        }
    }

    fn optional(name: &'static str, node: Option<&'a Node>) -> Self {
        Self {
            name,
            shape: FieldShape::Single(node),
        }
    }

    fn fixed(name: &'static str, nodes: &'a [Node]) -> Self {
        Self {
            name,
            shape: FieldShape::Fixed(nodes),
        }
    }

    fn dynamic(name: &'static str, nodes: &'a [Node]) -> Self {
        Self {
            name,
            shape: FieldShape::Dynamic(nodes),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> FieldShape<'a> {
        self.shape
    }

    /// The child of a single-child field.
    pub fn get(&self) -> Option<&'a Node> {
        match self.shape {
            FieldShape::Single(node) => node,
            FieldShape::Fixed(_) | FieldShape::Dynamic(_) => None,
        }
    }

    /// Children with their positional index (`None` for single-child fields).
    pub fn children(&self) -> impl Iterator<Item = (&'a Node, Option<usize>)> + 'a {
        let (single, many): (Option<&'a Node>, &'a [Node]) = match self.shape {
            FieldShape::Single(node) => (node, &[]),
            FieldShape::Fixed(nodes) | FieldShape::Dynamic(nodes) => (None, nodes),
        };
        single
            .into_iter()
            .map(|node| (node, None))
            .chain(many.iter().enumerate().map(|(i, node)| (node, Some(i))))
    }

    pub fn len(&self) -> usize {
        match self.shape {
            FieldShape::Single(node) => usize::from(node.is_some()),
            FieldShape::Fixed(nodes) | FieldShape::Dynamic(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Address of the whole field.
    pub fn path(&self) -> FieldPath {
        FieldPath {
            name: self.name,
            index: None,
        }
    }

    /// Address of element `index` of an array or collection field.
    pub fn with_index(&self, index: usize) -> FieldPath {
        FieldPath {
            name: self.name,
            index: Some(index),
        }
    }
}

/// Where a child hangs off its parent: field name plus element index for
/// array and collection fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub name: &'static str,
    pub index: Option<usize>,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(self.name),
        }
    }
}

/// Declared fields of one node, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FieldMap<'a>(Vec<FieldDescriptor<'a>>);

impl<'a> FieldMap<'a> {
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<'a>> {
        self.0.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor<'a>> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|d| d.name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every child in field order, tagged with its address.
    pub fn children(&self) -> impl Iterator<Item = (FieldPath, &'a Node)> + '_ {
        self.0.iter().flat_map(|descriptor| {
            descriptor.children().map(move |(child, index)| {
                let path = match index {
                    Some(i) => descriptor.with_index(i),
                    None => descriptor.path(),
                };
                (path, child)
            })
        })
    }
}

impl<'a> IntoIterator for FieldMap<'a> {
    type Item = FieldDescriptor<'a>;
    type IntoIter = std::vec::IntoIter<FieldDescriptor<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Node {
    /// Child-bearing fields of this node, in declaration order.
    pub fn fields(&self) -> FieldMap<'_> {
        use FieldDescriptor as F;

        let fields = match &self.kind {
            NodeKind::Identifier { .. }
            | NodeKind::IntegerLiteral { .. }
            | NodeKind::FloatLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::EmptyStatement => Vec::new(),

            NodeKind::BinaryExpression { left, right, .. } => {
                vec![F::single("left", left), F::single("right", right)]
            }
            NodeKind::UnaryExpression { operand, .. } => vec![F::single("operand", operand)],
            NodeKind::CompoundComparison { comparisons } => {
                vec![F::dynamic("comparisons", comparisons)]
            }
            NodeKind::TernaryOperator {
                condition,
                then_expr,
                else_expr,
            } => vec![
                F::single("condition", condition),
                F::single("then_expr", then_expr),
                F::single("else_expr", else_expr),
            ],
            NodeKind::AssignmentExpression { target, value, .. } => {
                vec![F::single("target", target), F::single("value", value)]
            }
            NodeKind::FunctionCall {
                function,
                arguments,
            } => vec![
                F::single("function", function),
                F::dynamic("arguments", arguments),
            ],
            NodeKind::MemberAccess { object, member } => {
                vec![F::single("object", object), F::single("member", member)]
            }
            NodeKind::IndexExpression { target, indices } => {
                vec![F::single("target", target), F::fixed("indices", indices)]
            }
            NodeKind::ArrayLiteral { elements } => vec![F::dynamic("elements", elements)],
            NodeKind::DictLiteral { entries } => vec![F::dynamic("entries", entries)],
            NodeKind::KeyValuePair { key, value } => {
                vec![F::single("key", key), F::single("value", value)]
            }
            NodeKind::ArrayNew {
                element_type,
                dimensions,
                initializer,
            } => vec![
                F::optional("element_type", element_type.as_deref()),
                F::fixed("dimensions", dimensions),
                F::dynamic("initializer", initializer),
            ],
            NodeKind::Lambda { parameters, body } => vec![
                F::dynamic("parameters", parameters),
                F::single("body", body),
            ],
            NodeKind::ParenthesizedExpression { expression }
            | NodeKind::ExpressionStatement { expression } => {
                vec![F::single("expression", expression)]
            }
            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => vec![
                F::single("condition", condition),
                F::single("then_branch", then_branch),
                F::optional("else_branch", else_branch.as_deref()),
            ],
            NodeKind::WhileLoop { condition, body } => {
                vec![F::single("condition", condition), F::single("body", body)]
            }
            NodeKind::ForEachLoop {
                variable,
                iterable,
                body,
            } => vec![
                F::single("variable", variable),
                F::single("iterable", iterable),
                F::single("body", body),
            ],
            NodeKind::ReturnStatement { value } => vec![F::optional("value", value.as_deref())],
            NodeKind::CompoundStatement { statements } => {
                vec![F::dynamic("statements", statements)]
            }
            NodeKind::FunctionDefinition {
                name,
                parameters,
                body,
            } => vec![
                F::single("name", name),
                F::dynamic("parameters", parameters),
                F::single("body", body),
            ],
            NodeKind::ProgramEntryPoint { body } => vec![F::dynamic("body", body)],
        };
        FieldMap(fields)
    }

    /// Direct children in field order, mutably.
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        fn one(node: &mut Node) -> std::iter::Once<&mut Node> {
            std::iter::once(node)
        }

        match &mut self.kind {
            NodeKind::Identifier { .. }
            | NodeKind::IntegerLiteral { .. }
            | NodeKind::FloatLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::EmptyStatement => Vec::new(),

            NodeKind::BinaryExpression { left, right, .. } => one(left).chain(one(right)).collect(),
            NodeKind::UnaryExpression { operand, .. } => vec![operand.as_mut()],
            NodeKind::CompoundComparison { comparisons } => comparisons.iter_mut().collect(),
            NodeKind::TernaryOperator {
                condition,
                then_expr,
                else_expr,
            } => vec![condition.as_mut(), then_expr.as_mut(), else_expr.as_mut()],
            NodeKind::AssignmentExpression { target, value, .. } => {
                vec![target.as_mut(), value.as_mut()]
            }
            NodeKind::FunctionCall {
                function,
                arguments,
            } => one(function).chain(arguments.iter_mut()).collect(),
            NodeKind::MemberAccess { object, member } => vec![object.as_mut(), member.as_mut()],
            NodeKind::IndexExpression { target, indices } => {
                one(target).chain(indices.iter_mut()).collect()
            }
            NodeKind::ArrayLiteral { elements } => elements.iter_mut().collect(),
            NodeKind::DictLiteral { entries } => entries.iter_mut().collect(),
            NodeKind::KeyValuePair { key, value } => vec![key.as_mut(), value.as_mut()],
            NodeKind::ArrayNew {
                element_type,
                dimensions,
                initializer,
            } => element_type
                .as_deref_mut()
                .into_iter()
                .chain(dimensions.iter_mut())
                .chain(initializer.iter_mut())
                .collect(),
            NodeKind::Lambda { parameters, body } => {
                parameters.iter_mut().chain(one(body)).collect()
            }
            NodeKind::ParenthesizedExpression { expression }
            | NodeKind::ExpressionStatement { expression } => vec![expression.as_mut()],
            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => one(condition)
                .chain(one(then_branch))
                .chain(else_branch.as_deref_mut())
                .collect(),
            NodeKind::WhileLoop { condition, body } => vec![condition.as_mut(), body.as_mut()],
            NodeKind::ForEachLoop {
                variable,
                iterable,
                body,
            } => vec![variable.as_mut(), iterable.as_mut(), body.as_mut()],
            NodeKind::ReturnStatement { value } => value.as_deref_mut().into_iter().collect(),
            NodeKind::CompoundStatement { statements } => statements.iter_mut().collect(),
            NodeKind::FunctionDefinition {
                name,
                parameters,
                body,
            } => one(name)
                .chain(parameters.iter_mut())
                .chain(one(body))
                .collect(),
            NodeKind::ProgramEntryPoint { body } => body.iter_mut().collect(),
        }
    }

    /// Deep copy whose nodes all carry fresh ids from `ids`.
    pub fn clone_with_fresh_ids(&self, ids: &crate::IdAllocator) -> Node {
        let mut copy = self.clone();
        let mut stack = vec![&mut copy];
        while let Some(node) = stack.pop() {
            node.id = ids.next_node_id();
            stack.extend(node.children_mut());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdAllocator;

    fn sample(ids: &IdAllocator) -> Node {
        ids.node(NodeKind::ArrayNew {
            element_type: Some(Box::new(ids.node(NodeKind::ident("int")))),
            dimensions: vec![ids.node(NodeKind::int(2)), ids.node(NodeKind::int(3))]
                .into_boxed_slice(),
            initializer: vec![
                ids.node(NodeKind::int(1)),
                ids.node(NodeKind::int(2)),
                ids.node(NodeKind::int(3)),
            ],
        })
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let ids = IdAllocator::new();
        let node = sample(&ids);
        let fields = node.fields();

        let names: Vec<_> = fields.names().collect();
        assert_eq!(names, ["element_type", "dimensions", "initializer"]);
        assert!(matches!(
            fields.get("dimensions").map(|d| d.shape()),
            Some(FieldShape::Fixed(dims)) if dims.len() == 2
        ));
        assert_eq!(fields.get("initializer").map(|d| d.len()), Some(3));
        assert!(fields.get("missing").is_none());
    }

    #[test]
    fn test_fields_are_stable_across_calls() {
        let ids = IdAllocator::new();
        let node = sample(&ids);
        let first: Vec<_> = node.fields().children().map(|(p, n)| (p, n.id)).collect();
        let second: Vec<_> = node.fields().children().map(|(p, n)| (p, n.id)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_with_index_addresses_element() {
        let ids = IdAllocator::new();
        let node = sample(&ids);
        let fields = node.fields();
        let dims = fields.get("dimensions").unwrap();

        assert_eq!(dims.with_index(1).to_string(), "dimensions[1]");
        assert_eq!(fields.get("element_type").unwrap().path().to_string(), "element_type");
    }

    #[test]
    fn test_absent_single_child_is_empty() {
        let ids = IdAllocator::new();
        let node = ids.node(NodeKind::return_stmt(None));
        let fields = node.fields();
        let value = fields.get("value").unwrap();
        assert!(value.is_empty());
        assert!(value.get().is_none());
        assert_eq!(fields.children().count(), 0);
    }

    #[test]
    fn test_children_mut_matches_fields() {
        let ids = IdAllocator::new();
        let mut node = sample(&ids);
        let expected: Vec<_> = node.fields().children().map(|(_, n)| n.id).collect();
        let actual: Vec<_> = node.children_mut().into_iter().map(|n| n.id).collect();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_clone_with_fresh_ids() {
        let ids = IdAllocator::new();
        let node = sample(&ids);
        let copy = node.clone_with_fresh_ids(&ids);

        assert_ne!(copy.id, node.id);
        let original: Vec<_> = node.fields().children().map(|(_, n)| n.id).collect();
        for (_, child) in copy.fields().children() {
            assert!(!original.contains(&child.id));
        }
        assert_eq!(copy.kind_name(), "array_new");
    }
}
