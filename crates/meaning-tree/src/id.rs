//! Identity for nodes and tokens.
//!
//! Ids are handed out by an explicit [`IdAllocator`] rather than a process
//! global, so independent translations can run side by side and tests can
//! reset the sequence deterministically.

use crate::node::{Node, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a [`Node`] within the sequence of the allocator that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// Identity of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source shared by one translation session.
///
/// Node and token ids come from separate counters. Both are atomic, so an
/// allocator may be shared by reference across threads.
#[derive(Debug, Default)]
pub struct IdAllocator {
    nodes: AtomicU64,
    tokens: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose first node and token id is `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            nodes: AtomicU64::new(seed),
            tokens: AtomicU64::new(seed),
        }
    }

    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.nodes.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_token_id(&self) -> TokenId {
        TokenId(self.tokens.fetch_add(1, Ordering::Relaxed))
    }

    /// Restart both sequences at `seed`.
    ///
    /// Meant for tests and tools; ids handed out before the reset may be
    /// handed out again.
    pub fn reset(&self, seed: u64) {
        self.nodes.store(seed, Ordering::Relaxed);
        self.tokens.store(seed, Ordering::Relaxed);
    }

    /// Make sure later node ids are strictly greater than `id`.
    pub fn observe_node_id(&self, id: NodeId) {
        self.nodes.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }

    /// Make sure later token ids are strictly greater than `id`.
    pub fn observe_token_id(&self, id: TokenId) {
        self.tokens.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }

    /// Wrap `kind` into a fresh node.
    pub fn node(&self, kind: NodeKind) -> Node {
        Node::new(self.next_node_id(), kind)
    }
}
