//! Graphviz export.
//!
//! Edges are labelled with the field (and element index) the child was
//! reached through, so the picture mirrors [`Node::fields`].

use crate::node::{Node, NodeKind};

pub fn to_dot(root: &Node) -> String {
    let mut out = String::from("digraph meaning_tree {\n");
    for info in root.bfs() {
        let node = info.node;
        out.push_str(&format!(
            "    n{} [label=\"{}\"];\n",
            node.id,
            escape(&node_label(node))
        ));
        if let (Some(parent), Some(field)) = (info.parent, info.field) {
            out.push_str(&format!(
                "    n{} -> n{} [label=\"{}\"];\n",
                parent.id, node.id, field
            ));
        }
    }
    out.push_str("}\n");
    out
}

fn node_label(node: &Node) -> String {
    let kind = node.kind_name();
    match &node.kind {
        NodeKind::Identifier { name } => format!("{kind}: {name}"),
        NodeKind::IntegerLiteral { value } => format!("{kind}: {value}"),
        NodeKind::FloatLiteral { value } => format!("{kind}: {value}"),
        NodeKind::StringLiteral { value } => format!("{kind}: {value:?}"),
        NodeKind::BoolLiteral { value } => format!("{kind}: {value}"),
        NodeKind::BinaryExpression { op, .. } => format!("{kind}: {op:?}"),
        NodeKind::UnaryExpression { op, .. } => format!("{kind}: {op:?}"),
        NodeKind::AssignmentExpression { op: Some(op), .. } => format!("{kind}: {op:?}="),
        _ => kind.to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
