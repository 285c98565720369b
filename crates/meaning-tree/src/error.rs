//! Errors raised by the meaning tree model.

use crate::label::LabelKind;

/// Label construction failed. Raised at construction time; a label that
/// exists always carries a representable attribute.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("label {0:?}: attribute is not a primitive, string, array or map: {1}")]
    Unrepresentable(LabelKind, String),

    #[error("label {0:?}: attribute is null; use Label::new for attribute-less labels")]
    NullAttribute(LabelKind),
}

/// Encoding or decoding a tree failed.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("malformed tree json: {0}")]
    Json(#[from] serde_json::Error),
}
