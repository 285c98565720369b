//! Lazy breadth-first and depth-first traversal.
//!
//! Both walkers are written purely against [`Node::fields`]; each step does
//! work proportional to the children of the yielded node only.

use crate::fields::FieldPath;
use crate::id::NodeId;
use crate::node::Node;
use std::collections::VecDeque;

/// One visited node with the place it was reached from.
#[derive(Debug, Clone, Copy)]
pub struct NodeInfo<'a> {
    pub node: &'a Node,
    pub parent: Option<&'a Node>,
    /// Field (and element index) of `parent` holding `node`; `None` for the root.
    pub field: Option<FieldPath>,
    pub depth: usize,
}

impl<'a> NodeInfo<'a> {
    fn root(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            field: None,
            depth: 0,
        }
    }
}

/// Decides whether a walker descends into `child` of `parent`. Returning
/// `false` prunes the child together with its subtree.
pub trait EnterCondition {
    fn check_enter(&mut self, child: &Node, parent: &Node) -> bool;
}

/// Enter every child.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnterAll;

impl EnterCondition for EnterAll {
    fn check_enter(&mut self, _child: &Node, _parent: &Node) -> bool {
        true
    }
}

impl<F> EnterCondition for F
where
    F: FnMut(&Node, &Node) -> bool,
{
    fn check_enter(&mut self, child: &Node, parent: &Node) -> bool {
        self(child, parent)
    }
}

fn child_infos<'a>(info: &NodeInfo<'a>, condition: &mut impl EnterCondition) -> Vec<NodeInfo<'a>> {
    let node = info.node;
    let mut children = Vec::new();
    for descriptor in node.fields() {
        for (child, index) in descriptor.children() {
            if !condition.check_enter(child, node) {
                continue;
            }
            let field = index.map_or(descriptor.path(), |i| descriptor.with_index(i));
            children.push(NodeInfo {
                node: child,
                parent: Some(node),
                field: Some(field),
                depth: info.depth + 1,
            });
        }
    }
    children
}

/// Breadth-first walk in field declaration order.
pub struct BreadthFirst<'a, C = EnterAll> {
    queue: VecDeque<NodeInfo<'a>>,
    root: NodeId,
    include_root: bool,
    condition: C,
}

impl<'a> BreadthFirst<'a> {
    pub fn new(root: &'a Node, include_root: bool) -> Self {
        Self {
            queue: VecDeque::from([NodeInfo::root(root)]),
            root: root.id,
            include_root,
            condition: EnterAll,
        }
    }
}

impl<'a, C: EnterCondition> BreadthFirst<'a, C> {
    /// Replace the enter condition. Call before the first `next`.
    pub fn with_condition<D: EnterCondition>(self, condition: D) -> BreadthFirst<'a, D> {
        BreadthFirst {
            queue: self.queue,
            root: self.root,
            include_root: self.include_root,
            condition,
        }
    }
}

impl<'a, C: EnterCondition> Iterator for BreadthFirst<'a, C> {
    type Item = NodeInfo<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let info = self.queue.pop_front()?;
            self.queue.extend(child_infos(&info, &mut self.condition));
            if info.parent.is_none() && info.node.id == self.root && !self.include_root {
                continue;
            }
            return Some(info);
        }
    }
}

/// Pre-order depth-first walk in field declaration order.
pub struct DepthFirst<'a, C = EnterAll> {
    stack: Vec<NodeInfo<'a>>,
    include_root: bool,
    condition: C,
}

impl<'a> DepthFirst<'a> {
    pub fn new(root: &'a Node, include_root: bool) -> Self {
        Self {
            stack: vec![NodeInfo::root(root)],
            include_root,
            condition: EnterAll,
        }
    }
}

impl<'a, C: EnterCondition> DepthFirst<'a, C> {
    /// Replace the enter condition. Call before the first `next`.
    pub fn with_condition<D: EnterCondition>(self, condition: D) -> DepthFirst<'a, D> {
        DepthFirst {
            stack: self.stack,
            include_root: self.include_root,
            condition,
        }
    }
}

impl<'a, C: EnterCondition> Iterator for DepthFirst<'a, C> {
    type Item = NodeInfo<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let info = self.stack.pop()?;
            self.stack
                .extend(child_infos(&info, &mut self.condition).into_iter().rev());
            if info.parent.is_none() && !self.include_root {
                continue;
            }
            return Some(info);
        }
    }
}

impl Node {
    /// Breadth-first walk including this node.
    pub fn bfs(&self) -> BreadthFirst<'_> {
        BreadthFirst::new(self, true)
    }

    /// Depth-first walk including this node.
    pub fn dfs(&self) -> DepthFirst<'_> {
        DepthFirst::new(self, true)
    }

    /// First node in this subtree carrying `id`.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.dfs().map(|info| info.node).find(|node| node.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdAllocator;
    use crate::node::{BinaryOp, NodeKind};

    // (a + b) * c
    fn expression(ids: &IdAllocator) -> Node {
        let sum = ids.node(NodeKind::binary(
            ids.node(NodeKind::ident("a")),
            BinaryOp::Add,
            ids.node(NodeKind::ident("b")),
        ));
        ids.node(NodeKind::binary(sum, BinaryOp::Mul, ids.node(NodeKind::ident("c"))))
    }

    fn names<'a>(infos: impl Iterator<Item = NodeInfo<'a>>) -> Vec<String> {
        infos
            .map(|info| match &info.node.kind {
                NodeKind::Identifier { name } => name.clone(),
                other => other.name().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_bfs_order_and_depth() {
        let ids = IdAllocator::new();
        let root = expression(&ids);

        let visited: Vec<_> = root.bfs().collect();
        assert_eq!(
            names(visited.iter().copied()),
            ["binary_expression", "binary_expression", "c", "a", "b"]
        );
        let depths: Vec<_> = visited.iter().map(|i| i.depth).collect();
        assert_eq!(depths, [0, 1, 1, 2, 2]);
        assert_eq!(visited[2].field.map(|f| f.name), Some("right"));
        assert_eq!(visited[2].parent.map(|p| p.id), Some(root.id));
    }

    #[test]
    fn test_dfs_is_preorder() {
        let ids = IdAllocator::new();
        let root = expression(&ids);
        assert_eq!(
            names(root.dfs()),
            ["binary_expression", "binary_expression", "a", "b", "c"]
        );
    }

    #[test]
    fn test_exclude_root() {
        let ids = IdAllocator::new();
        let root = expression(&ids);
        assert_eq!(BreadthFirst::new(&root, false).count(), 4);
        assert_eq!(DepthFirst::new(&root, false).count(), 4);
    }

    #[test]
    fn test_condition_prunes_subtree() {
        let ids = IdAllocator::new();
        let root = expression(&ids);
        let visited = BreadthFirst::new(&root, true)
            .with_condition(|child: &Node, _parent: &Node| {
                !matches!(child.kind, NodeKind::BinaryExpression { .. })
            });
        assert_eq!(names(visited), ["binary_expression", "c"]);
    }

    #[test]
    fn test_condition_prunes_depth_first() {
        let ids = IdAllocator::new();
        let root = expression(&ids);
        let skip_a = |child: &Node, _parent: &Node| {
            !matches!(&child.kind, NodeKind::Identifier { name } if name == "a")
        };
        assert_eq!(
            names(DepthFirst::new(&root, true).with_condition(skip_a)),
            ["binary_expression", "binary_expression", "b", "c"]
        );

        let visited = DepthFirst::new(&root, false).with_condition(|child: &Node, _parent: &Node| {
            !matches!(child.kind, NodeKind::BinaryExpression { .. })
        });
        assert_eq!(names(visited), ["c"]);
    }

    #[test]
    fn test_find_by_id() {
        let ids = IdAllocator::new();
        let root = expression(&ids);
        let c = root.bfs().nth(2).unwrap().node.id;
        assert!(matches!(
            root.find(c).map(|n| &n.kind),
            Some(NodeKind::Identifier { name }) if name == "c"
        ));
        assert!(root.find(NodeId(999)).is_none());
    }
}
