//! Traits for language readers.

use std::collections::HashMap;
use std::ops::Range;

use meaning_tree::{ByteSpan, IdAllocator, MeaningTree};
use serde_json::Value;
use tracing::debug;

/// Error that can occur when reading source code into a meaning tree.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported syntax: {0}")]
    Unsupported(String),

    #[error("expected {expected}, got {got}")]
    UnexpectedNode { expected: String, got: String },
}

/// Per-call reader input beyond the source text.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Values to attach to the node spanning exactly the given bytes.
    pub value_tags: HashMap<ByteSpan, Value>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_tag(mut self, range: Range<usize>, value: Value) -> Self {
        self.value_tags.insert(ByteSpan::from(range), value);
        self
    }
}

/// A reader parses source code into a meaning tree.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "python").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles (e.g., &["py"]).
    fn extensions(&self) -> &'static [&'static str];

    fn read_with(
        &self,
        source: &str,
        ids: &IdAllocator,
        options: &ReadOptions,
    ) -> Result<MeaningTree, ReadError>;

    fn read(&self, source: &str, ids: &IdAllocator) -> Result<MeaningTree, ReadError> {
        self.read_with(source, ids, &ReadOptions::default())
    }

    /// [`read`](Self::read), with any failure reported as `None`.
    fn try_read(&self, source: &str, ids: &IdAllocator) -> Option<MeaningTree> {
        match self.read(source, ids) {
            Ok(tree) => Some(tree),
            Err(err) => {
                debug!(language = self.language(), %err, "read failed");
                None
            }
        }
    }
}
