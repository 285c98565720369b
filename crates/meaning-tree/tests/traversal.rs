//! Generic traversal over heterogeneous field shapes.

use meaning_tree::{
    BreadthFirst, FieldPath, IdAllocator, MeaningTree, Node, NodeKind, StructureEq,
};

/// `new T[n0][n1]... { e0, e1, ... }` with `n` dimensions and `m` initializers.
fn array_new(ids: &IdAllocator, n: usize, m: usize) -> Node {
    ids.node(NodeKind::ArrayNew {
        element_type: Some(Box::new(ids.node(NodeKind::ident("T")))),
        dimensions: (0..n)
            .map(|i| ids.node(NodeKind::int(i as i64)))
            .collect::<Vec<_>>()
            .into_boxed_slice(),
        initializer: (0..m)
            .map(|i| ids.node(NodeKind::int(100 + i as i64)))
            .collect(),
    })
}

#[test]
fn bfs_visits_every_field_shape_once() {
    let ids = IdAllocator::new();
    let (n, m) = (3, 4);
    let root = array_new(&ids, n, m);

    let children: Vec<_> = BreadthFirst::new(&root, false).collect();
    assert_eq!(children.len(), 1 + n + m);
    assert!(children.iter().all(|info| info.depth == 1));
    assert!(children.iter().all(|info| info.parent.map(|p| p.id) == Some(root.id)));

    let paths: Vec<FieldPath> = children.iter().filter_map(|info| info.field).collect();
    assert_eq!(
        paths[0],
        FieldPath {
            name: "element_type",
            index: None
        }
    );
    for i in 0..n {
        assert_eq!(paths[1 + i].name, "dimensions");
        assert_eq!(paths[1 + i].index, Some(i));
    }
    for i in 0..m {
        assert_eq!(paths[1 + n + i].name, "initializer");
        assert_eq!(paths[1 + n + i].index, Some(i));
    }
}

#[test]
fn bfs_is_lazy() {
    let ids = IdAllocator::new();
    let root = array_new(&ids, 2, 2);

    let mut walk = BreadthFirst::new(&root, true);
    let first = walk.next().expect("root");
    assert_eq!(first.node.id, root.id);
    assert_eq!(first.depth, 0);
    assert!(first.field.is_none());
    // remaining children are produced on demand
    assert_eq!(walk.count(), 5);
}

#[test]
fn serialize_deserialize_serialize_is_stable() {
    let ids = IdAllocator::with_seed(7);
    let tree = MeaningTree::new(ids.node(NodeKind::program(vec![
        ids.node(NodeKind::expr_stmt(array_new(&ids, 2, 1))),
    ])));

    let first = tree.to_json().unwrap();
    let reloaded = MeaningTree::from_json(&first, &ids).unwrap();
    assert_eq!(reloaded.to_json().unwrap(), first);
    assert!(reloaded.structure_eq(&tree));

    let original: Vec<_> = tree.bfs().map(|info| info.node.id).collect();
    let loaded: Vec<_> = reloaded.bfs().map(|info| info.node.id).collect();
    assert_eq!(original, loaded);
}
