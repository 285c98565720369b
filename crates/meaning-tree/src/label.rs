//! Small typed annotations attachable to nodes and trees.
//!
//! A label is a numeric kind plus an optional attribute. Labels carry
//! cross-cutting metadata (origin language, byte span, mutation markers)
//! without widening every node type.

use crate::error::LabelError;
use crate::span::ByteSpan;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label kind code. Non-negative codes are reserved, negative codes are free
/// for user-defined labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelKind(pub i16);

impl LabelKind {
    /// Generic value holder.
    pub const VALUE: Self = Self(0);
    /// Render nothing for this node.
    pub const DUMMY: Self = Self(1);
    /// Node was changed after parsing.
    pub const MUTATED: Self = Self(2);
    /// Language the tree was read from; attribute is the language name.
    pub const ORIGIN_LANGUAGE: Self = Self(3);
    /// Source range; attribute is `[start, len]`.
    pub const BYTE_SPAN: Self = Self(4);

    pub fn is_user_defined(self) -> bool {
        self.0 < 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "id")]
    kind: LabelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attr: Option<Value>,
}

impl Label {
    /// Label without an attribute.
    pub fn new(kind: LabelKind) -> Self {
        Self { kind, attr: None }
    }

    /// Label carrying `attr`.
    ///
    /// The attribute must map onto a primitive, a string, an array or a map.
    /// Anything else (including values that serialize to null, such as
    /// `None` or NaN) is rejected.
    pub fn with_attr<T: Serialize + ?Sized>(kind: LabelKind, attr: &T) -> Result<Self, LabelError> {
        let value = serde_json::to_value(attr)
            .map_err(|err| LabelError::Unrepresentable(kind, err.to_string()))?;
        if value.is_null() {
            return Err(LabelError::NullAttribute(kind));
        }
        Ok(Self {
            kind,
            attr: Some(value),
        })
    }

    pub fn byte_span(span: ByteSpan) -> Self {
        Self {
            kind: LabelKind::BYTE_SPAN,
            attr: Some(Value::from(vec![span.start, span.len])),
        }
    }

    pub fn origin_language(language: &str) -> Self {
        Self {
            kind: LabelKind::ORIGIN_LANGUAGE,
            attr: Some(Value::from(language)),
        }
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn attr(&self) -> Option<&Value> {
        self.attr.as_ref()
    }
}

/// At most one label per kind, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<Label>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `label`, replacing any label of the same kind in place.
    pub fn set(&mut self, label: Label) {
        match self.0.iter_mut().find(|l| l.kind == label.kind) {
            Some(existing) => *existing = label,
            None => self.0.push(label),
        }
    }

    pub fn get(&self, kind: LabelKind) -> Option<&Label> {
        self.0.iter().find(|l| l.kind == kind)
    }

    pub fn has(&self, kind: LabelKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn remove(&mut self, kind: LabelKind) -> Option<Label> {
        let index = self.0.iter().position(|l| l.kind == kind)?;
        Some(self.0.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the `BYTE_SPAN` label, if present and well formed.
    pub fn byte_span(&self) -> Option<ByteSpan> {
        let attr = self.get(LabelKind::BYTE_SPAN)?.attr()?;
        let start = attr.get(0)?.as_u64()?;
        let len = attr.get(1)?.as_u64()?;
        Some(ByteSpan::new(start as usize, len as usize))
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.set(label);
        }
        set
    }
}
