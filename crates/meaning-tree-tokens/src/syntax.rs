//! Read-only view of a concrete syntax tree.
//!
//! The engine walks any tree exposing kinds, byte ranges and field-tagged
//! children. `tree_sitter::Node` is the production implementation.

use std::ops::Range;

/// A child together with the grammar field it sits in, if any.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxChild<N> {
    pub field: Option<&'static str>,
    pub node: N,
}

pub trait SyntaxNode: Copy {
    fn kind(&self) -> &str;

    fn byte_range(&self) -> Range<usize>;

    /// All children, named and anonymous, in source order.
    fn children(&self) -> Vec<SyntaxChild<Self>>;

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.byte_range()).unwrap_or("")
    }
}

impl<'tree> SyntaxNode for tree_sitter::Node<'tree> {
    fn kind(&self) -> &str {
        tree_sitter::Node::kind(self)
    }

    fn byte_range(&self) -> Range<usize> {
        tree_sitter::Node::byte_range(self)
    }

    fn children(&self) -> Vec<SyntaxChild<Self>> {
        let mut cursor = self.walk();
        let mut out = Vec::new();
        if cursor.goto_first_child() {
            loop {
                out.push(SyntaxChild {
                    field: cursor.field_name(),
                    node: cursor.node(),
                });
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        out
    }

    fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }
}
