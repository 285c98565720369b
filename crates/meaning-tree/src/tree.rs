//! The serializable unit: one program or expression.

use crate::error::TreeError;
use crate::id::{IdAllocator, NodeId};
use crate::label::{Label, LabelKind, LabelSet};
use crate::node::Node;
use crate::traverse::{BreadthFirst, DepthFirst};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeaningTree {
    root: Node,
    #[serde(default, skip_serializing_if = "LabelSet::is_empty")]
    labels: LabelSet,
}

impl MeaningTree {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            labels: LabelSet::new(),
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.set(label);
        self
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut LabelSet {
        &mut self.labels
    }

    /// Language recorded by the reader that produced this tree.
    pub fn origin_language(&self) -> Option<&str> {
        self.labels.get(LabelKind::ORIGIN_LANGUAGE)?.attr()?.as_str()
    }

    pub fn bfs(&self) -> BreadthFirst<'_> {
        BreadthFirst::new(&self.root, true)
    }

    pub fn dfs(&self) -> DepthFirst<'_> {
        DepthFirst::new(&self.root, true)
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn max_node_id(&self) -> NodeId {
        self.dfs()
            .map(|info| info.node.id)
            .max()
            .unwrap_or(self.root.id)
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a tree, keeping the ids found in the payload.
    ///
    /// `ids` is advanced past the largest loaded id so nodes created
    /// afterwards never collide with loaded ones. Nesting depth is not
    /// limited; the stack grows on demand while decoding.
    pub fn from_json(json: &str, ids: &IdAllocator) -> Result<Self, TreeError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();
        let tree = Self::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        let max = tree.max_node_id();
        trace!(%max, "loaded meaning tree");
        ids.observe_node_id(max);
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BinaryOp, NodeKind};
    use crate::span::ByteSpan;
    use serde_json::json;

    fn sample(ids: &IdAllocator) -> MeaningTree {
        let mut left = ids.node(NodeKind::ident("x")).with_span(ByteSpan::new(0, 1));
        left.set_value_tag(json!(7));
        let sum = ids.node(NodeKind::binary(left, BinaryOp::Add, ids.node(NodeKind::float(1.5))));
        MeaningTree::new(ids.node(NodeKind::program(vec![ids.node(NodeKind::expr_stmt(sum))])))
            .with_label(Label::origin_language("python"))
    }

    #[test]
    fn test_json_roundtrip_keeps_ids() {
        let ids = IdAllocator::with_seed(100);
        let tree = sample(&ids);

        let first = tree.to_json().unwrap();
        let loaded = MeaningTree::from_json(&first, &IdAllocator::new()).unwrap();
        let second = loaded.to_json().unwrap();

        assert_eq!(first, second);
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_wire_shape() {
        let ids = IdAllocator::new();
        let tree = sample(&ids);
        let value: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();

        let stmt = &value["root"]["body"][0];
        assert_eq!(value["root"]["type"], "program_entry_point");
        assert_eq!(stmt["type"], "expression_statement");
        let left = &stmt["expression"]["left"];
        assert_eq!(left["type"], "identifier");
        assert_eq!(left["labels"], json!([{ "id": 4, "attr": [0, 1] }]));
        assert_eq!(left["value_tag"], 7);
        assert_eq!(value["labels"], json!([{ "id": 3, "attr": "python" }]));
    }

    #[test]
    fn test_loading_advances_allocator() {
        let ids = IdAllocator::with_seed(50);
        let json = sample(&ids).to_json().unwrap();

        let fresh = IdAllocator::new();
        let tree = MeaningTree::from_json(&json, &fresh).unwrap();
        assert!(fresh.next_node_id() > tree.max_node_id());
        assert_eq!(tree.origin_language(), Some("python"));
    }

    #[test]
    fn test_deep_tree_roundtrips() {
        let ids = IdAllocator::new();
        let mut expr = ids.node(NodeKind::ident("a"));
        for _ in 0..250 {
            expr = ids.node(NodeKind::binary(expr, BinaryOp::Add, ids.node(NodeKind::ident("a"))));
        }
        let tree = MeaningTree::new(ids.node(NodeKind::program(vec![ids.node(NodeKind::expr_stmt(expr))])));

        let first = tree.to_json().unwrap();
        let loaded = MeaningTree::from_json(&first, &IdAllocator::new()).unwrap();
        assert_eq!(loaded.to_json().unwrap(), first);
        assert_eq!(loaded.max_node_id(), tree.max_node_id());
    }

    #[test]
    fn test_largest_id_loads() {
        let json = r#"{"root":{"type":"null_literal","id":18446744073709551615}}"#;
        let ids = IdAllocator::new();
        let tree = MeaningTree::from_json(json, &ids).unwrap();
        assert_eq!(tree.root().id, NodeId(u64::MAX));
        assert_eq!(ids.next_node_id(), NodeId(u64::MAX));
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        let ids = IdAllocator::new();
        let json = format!("{} x", sample(&ids).to_json().unwrap());
        assert!(MeaningTree::from_json(&json, &ids).is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let ids = IdAllocator::new();
        assert!(MeaningTree::from_json(r#"{"root": {"type": "nope"}}"#, &ids).is_err());
    }
}
