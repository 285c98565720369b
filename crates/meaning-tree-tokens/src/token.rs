//! Atomic lexical units and operator metadata.

use meaning_tree::{ByteSpan, IdAllocator, TokenId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Identifier,
    CallableIdentifier,
    Const,
    Keyword,
    Operator,
    OpeningBrace,
    ClosingBrace,
    Comma,
    Separator,
    StatementToken,
    Cast,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Associativity {
    Left,
    Right,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Arity {
    Unary,
    Binary,
    Ternary,
}

/// Role an operand plays relative to its operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperandPosition {
    Left,
    Center,
    Right,
}

impl OperandPosition {
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }
}

/// Where the operator is written relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenPosition {
    Prefix,
    Infix,
    Postfix,
}

/// Coarse operator family, for consumers that group operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpType {
    Arithmetic,
    Bitwise,
    Comparison,
    Logical,
    Assignment,
    Access,
    Call,
    Conditional,
}

/// Metadata carried by operator tokens.
///
/// Higher `precedence` binds tighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub precedence: i32,
    pub associativity: Associativity,
    pub arity: Arity,
    /// Whether the language guarantees the order operands are evaluated in.
    pub is_strict_order: bool,
    pub position: Option<TokenPosition>,
    pub first_evaluated: Option<OperandPosition>,
    pub op_type: Option<OpType>,
}

impl OperatorInfo {
    pub fn new(precedence: i32, associativity: Associativity, arity: Arity) -> Self {
        Self {
            precedence,
            associativity,
            arity,
            is_strict_order: false,
            position: None,
            first_evaluated: None,
            op_type: None,
        }
    }

    pub fn binary(precedence: i32, associativity: Associativity) -> Self {
        Self::new(precedence, associativity, Arity::Binary).at(TokenPosition::Infix)
    }

    pub fn prefix(precedence: i32) -> Self {
        Self::new(precedence, Associativity::Right, Arity::Unary).at(TokenPosition::Prefix)
    }

    pub fn postfix(precedence: i32) -> Self {
        Self::new(precedence, Associativity::Left, Arity::Unary).at(TokenPosition::Postfix)
    }

    pub fn ternary(precedence: i32) -> Self {
        Self::new(precedence, Associativity::Right, Arity::Ternary)
    }

    pub fn at(mut self, position: TokenPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Mark operand evaluation order as guaranteed, starting at `first`.
    pub fn strict(mut self, first: OperandPosition) -> Self {
        self.is_strict_order = true;
        self.first_evaluated = Some(first);
        self
    }

    pub fn of_type(mut self, op_type: OpType) -> Self {
        self.op_type = Some(op_type);
        self
    }
}

/// Operator spelled as several disjoint fragments, like `a[i]` or
/// `a ? b : c`. Each fragment is its own token; `fragment_index` says which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexOperator {
    pub info: OperatorInfo,
    pub fragments: Vec<String>,
    pub fragment_index: usize,
}

impl ComplexOperator {
    pub fn is_opening(&self) -> bool {
        self.fragment_index == 0
    }

    pub fn is_closing(&self) -> bool {
        self.fragment_index + 1 == self.fragments.len()
    }
}

/// What a token is beyond its text.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenClass {
    /// Not yet known to be part of an operand.
    Plain,
    Operand,
    Operator(OperatorInfo),
    ComplexOperator(ComplexOperator),
    /// Formatting only (whitespace, newlines).
    Pseudo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub value: String,
    pub token_type: TokenType,
    pub span: Option<ByteSpan>,
    /// Value tag copied from the node the token was produced for.
    pub assigned_value: Option<Value>,
    pub class: TokenClass,
}

impl Token {
    pub fn new(ids: &IdAllocator, value: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            id: ids.next_token_id(),
            value: value.into(),
            token_type,
            span: None,
            assigned_value: None,
            class: TokenClass::Plain,
        }
    }

    pub fn operator(ids: &IdAllocator, value: impl Into<String>, info: OperatorInfo) -> Self {
        Self {
            class: TokenClass::Operator(info),
            ..Self::new(ids, value, TokenType::Operator)
        }
    }

    pub fn complex_operator(
        ids: &IdAllocator,
        info: OperatorInfo,
        fragments: &[&str],
        fragment_index: usize,
    ) -> Self {
        let value = fragments.get(fragment_index).copied().unwrap_or_default();
        Self {
            class: TokenClass::ComplexOperator(ComplexOperator {
                info,
                fragments: fragments.iter().map(|f| f.to_string()).collect(),
                fragment_index,
            }),
            ..Self::new(ids, value, TokenType::Operator)
        }
    }

    pub fn pseudo(ids: &IdAllocator, value: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            class: TokenClass::Pseudo,
            ..Self::new(ids, value, token_type)
        }
    }

    pub fn with_span(mut self, span: ByteSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_assigned_value(mut self, value: Option<Value>) -> Self {
        self.assigned_value = value;
        self
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self.class,
            TokenClass::Operator(_) | TokenClass::ComplexOperator(_)
        )
    }

    pub fn operator_info(&self) -> Option<&OperatorInfo> {
        match &self.class {
            TokenClass::Operator(info) => Some(info),
            TokenClass::ComplexOperator(complex) => Some(&complex.info),
            _ => None,
        }
    }

    pub fn complex(&self) -> Option<&ComplexOperator> {
        match &self.class {
            TokenClass::ComplexOperator(complex) => Some(complex),
            _ => None,
        }
    }

    /// Operators count as operands too: a nested operator is an operand of
    /// the enclosing one.
    pub fn is_operand(&self) -> bool {
        matches!(
            self.class,
            TokenClass::Operand | TokenClass::Operator(_) | TokenClass::ComplexOperator(_)
        )
    }

    pub fn is_pseudo(&self) -> bool {
        matches!(self.class, TokenClass::Pseudo)
    }

    /// Pseudo token standing for a line break.
    pub fn is_newline(&self) -> bool {
        self.is_pseudo() && self.value.contains('\n')
    }

    /// Turn a plain token into an operand. Other classes are left alone.
    pub(crate) fn promote_to_operand(&mut self) {
        if matches!(self.class, TokenClass::Plain) {
            self.class = TokenClass::Operand;
        }
    }
}

/// Link from an operand token to the operator it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandLink {
    pub operator: TokenId,
    pub position: OperandPosition,
}
