//! Per-language tables consumed by the tokenizer.

use std::borrow::Cow;

use meaning_tree::{ByteSpan, IdAllocator};

use crate::token::{Arity, OperandPosition, Token};

/// A syntax leaf (or stop node) handed to [`OperatorTable::recognize_token`].
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    pub kind: &'a str,
    pub text: &'a str,
    pub span: ByteSpan,
    /// Field of the parent this leaf sits in.
    pub field: Option<&'static str>,
    pub parent_kind: Option<&'a str>,
}

/// Declarative operator description of one grammar.
///
/// All methods are pure lookups. Linking relies on grammar fields: an
/// operator node whose operands are unnamed children (Python's
/// `comparison_operator` and `conditional_expression`) has no mapping and
/// its operator tokens stay unlinked. The extended tokenizer links those
/// from the meaning tree instead.
pub trait OperatorTable {
    /// Node kinds that are operators of the given arity.
    fn operator_nodes(&self, arity: Arity) -> &'static [&'static str];

    /// Node kinds emitted as one token even when they have children.
    fn stop_nodes(&self) -> &'static [&'static str];

    /// Grammar field holding the operand at `position` of operator `kind`.
    ///
    /// A dotted `"field.kind"` value instead names an operand of the
    /// enclosing operator: when `kind` sits in that operator's `field`, its
    /// child of kind `kind` fills `position` of the enclosing operator.
    fn field_name_by_operand_pos(&self, position: OperandPosition, kind: &str) -> Option<&'static str>;

    fn recognize_token(&self, leaf: &Leaf<'_>, ids: &IdAllocator) -> Token;

    fn arity_of(&self, kind: &str) -> Option<Arity> {
        [Arity::Ternary, Arity::Binary, Arity::Unary]
            .into_iter()
            .find(|arity| self.operator_nodes(*arity).contains(&kind))
    }

    fn is_stop_node(&self, kind: &str) -> bool {
        self.stop_nodes().contains(&kind)
    }
}

/// A language the [`Tokenizer`](crate::Tokenizer) can parse end to end.
pub trait TokenizerLanguage: OperatorTable + Send + Sync {
    fn name(&self) -> &'static str;

    fn extensions(&self) -> &'static [&'static str] {
        &[]
    }

    fn grammar(&self) -> tree_sitter::Language;

    /// Rewrite source before parsing. Skipped when preparations are off.
    fn prepare<'a>(&self, code: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(code)
    }
}

/// Split a dotted operand mapping into `(ancestor field, child kind)`.
///
/// Only the first `.` separates; the rest belongs to the kind.
pub fn split_ancestor_mapping(mapping: &str) -> Option<(&str, &str)> {
    mapping.split_once('.')
}
