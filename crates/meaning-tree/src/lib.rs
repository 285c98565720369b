//! Language-neutral meaning tree.
//!
//! `meaning-tree` is the common representation every language plugin reads
//! into. It gives all plugins the same introspectable view of their
//! programs:
//!
//! - [`Node`] - identity (id, labels, value tag) around a closed [`NodeKind`]
//! - [`Node::fields`] - declared child fields as single, fixed or dynamic
//!   [`FieldDescriptor`]s, the only thing generic algorithms look at
//! - [`BreadthFirst`] / [`DepthFirst`] - lazy walks built on those fields
//! - [`MeaningTree`] - root plus tree labels; the serializable unit
//!
//! # Wire format
//!
//! Nodes serialize as `{"type": "<kind>", "id": n, "labels": [...], ...fields}`.
//! Ids survive a decode/encode round trip unchanged.
//!
//! ```ignore
//! use meaning_tree::{BinaryOp, IdAllocator, MeaningTree, NodeKind};
//!
//! let ids = IdAllocator::new();
//! let sum = ids.node(NodeKind::binary(
//!     ids.node(NodeKind::ident("a")),
//!     BinaryOp::Add,
//!     ids.node(NodeKind::int(1)),
//! ));
//! let json = MeaningTree::new(sum).to_json()?;
//! ```

pub mod dot;
pub mod error;
pub mod fields;
pub mod id;
pub mod label;
pub mod node;
pub mod span;
pub mod structure_eq;
pub mod traverse;
pub mod tree;

pub use dot::to_dot;
pub use error::{LabelError, TreeError};
pub use fields::{FieldDescriptor, FieldMap, FieldPath, FieldShape};
pub use id::{IdAllocator, NodeId, TokenId};
pub use label::{Label, LabelKind, LabelSet};
pub use node::{BinaryOp, Node, NodeKind, UnaryOp};
pub use span::ByteSpan;
pub use structure_eq::StructureEq;
pub use traverse::{BreadthFirst, DepthFirst, EnterAll, EnterCondition, NodeInfo};
pub use tree::MeaningTree;
