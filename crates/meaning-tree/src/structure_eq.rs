//! Structural equality for meaning trees.
//!
//! `structure_eq` compares trees ignoring identity and surface hints -
//! data that differs between copies or source languages but doesn't affect
//! program meaning.
//!
//! # Ignored
//!
//! - node ids, labels and value tags
//! - `ParenthesizedExpression` wrappers (grouping is implied by the tree)
//!
//! # Compared
//!
//! - node kinds, names, literal values, operators
//! - every child field, element by element

use crate::node::{Node, NodeKind};
use crate::tree::MeaningTree;

/// Trait for structural equality comparison.
///
/// Unlike `PartialEq`, a fresh-id clone is structurally equal to its source.
pub trait StructureEq {
    fn structure_eq(&self, other: &Self) -> bool;
}

impl StructureEq for MeaningTree {
    fn structure_eq(&self, other: &Self) -> bool {
        self.root().structure_eq(other.root())
    }
}

impl StructureEq for Node {
    fn structure_eq(&self, other: &Self) -> bool {
        let (a, b) = (strip_parens(self), strip_parens(other));
        if !payload_eq(&a.kind, &b.kind) {
            return false;
        }

        let (fa, fb) = (a.fields(), b.fields());
        fa.len() == fb.len()
            && fa.iter().zip(fb.iter()).all(|(da, db)| {
                da.len() == db.len()
                    && da
                        .children()
                        .zip(db.children())
                        .all(|((x, _), (y, _))| x.structure_eq(y))
            })
    }
}

fn strip_parens(mut node: &Node) -> &Node {
    while let NodeKind::ParenthesizedExpression { expression } = &node.kind {
        node = &**expression;
    }
    node
}

/// Compare everything a kind carries besides its children.
fn payload_eq(a: &NodeKind, b: &NodeKind) -> bool {
    match (a, b) {
        (NodeKind::Identifier { name: x }, NodeKind::Identifier { name: y }) => x == y,
        (NodeKind::IntegerLiteral { value: x }, NodeKind::IntegerLiteral { value: y }) => x == y,
        (NodeKind::FloatLiteral { value: x }, NodeKind::FloatLiteral { value: y }) => x == y,
        (NodeKind::StringLiteral { value: x }, NodeKind::StringLiteral { value: y }) => x == y,
        (NodeKind::BoolLiteral { value: x }, NodeKind::BoolLiteral { value: y }) => x == y,
        (NodeKind::BinaryExpression { op: x, .. }, NodeKind::BinaryExpression { op: y, .. }) => {
            x == y
        }
        (NodeKind::UnaryExpression { op: x, .. }, NodeKind::UnaryExpression { op: y, .. }) => {
            x == y
        }
        (
            NodeKind::AssignmentExpression { op: x, .. },
            NodeKind::AssignmentExpression { op: y, .. },
        ) => x == y,
        _ => a.name() == b.name(),
    }
}
