//! The language-neutral node model.
//!
//! A [`Node`] pairs identity (id, labels, an optional value tag) with a
//! [`NodeKind`] describing the construct. Children are owned by the field
//! that holds them; see [`crate::fields`] for the uniform view over them.

use crate::id::NodeId;
use crate::label::{Label, LabelKind, LabelSet};
use crate::span::ByteSpan;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "LabelSet::is_empty")]
    pub labels: LabelSet,
    /// Opaque value attached by a caller, e.g. the interpreted value of a
    /// subexpression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_tag: Option<Value>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            labels: LabelSet::new(),
            value_tag: None,
            kind,
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.set(label);
        self
    }

    pub fn with_span(self, span: ByteSpan) -> Self {
        self.with_label(Label::byte_span(span))
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn byte_span(&self) -> Option<ByteSpan> {
        self.labels.byte_span()
    }

    pub fn set_value_tag(&mut self, value: Value) {
        self.value_tag = Some(value);
    }

    pub fn mark_mutated(&mut self) {
        self.labels.set(Label::new(LabelKind::MUTATED));
    }

    pub fn is_mutated(&self) -> bool {
        self.labels.has(LabelKind::MUTATED)
    }

    /// Whether viewers should render nothing for this node.
    pub fn is_dummy(&self) -> bool {
        self.labels.has(LabelKind::DUMMY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    MatMul,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Is,
    IsNot,
    In,
    NotIn,

    // Logical
    And,
    Or,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,

    Concat,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Ne
                | Self::Lt
                | Self::Le
                | Self::Gt
                | Self::Ge
                | Self::Is
                | Self::IsNot
                | Self::In
                | Self::NotIn
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Length,
    Await,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    /// Whether the operator is written after its operand.
    pub fn is_postfix(self) -> bool {
        matches!(self, Self::PostIncrement | Self::PostDecrement)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    // Literals and names
    Identifier {
        name: String,
    },
    IntegerLiteral {
        value: i64,
    },
    FloatLiteral {
        value: f64,
    },
    StringLiteral {
        value: String,
    },
    BoolLiteral {
        value: bool,
    },
    NullLiteral,

    // Expressions
    BinaryExpression {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryExpression {
        op: UnaryOp,
        operand: Box<Node>,
    },
    /// Chained comparison `a < b < c`, one binary comparison per link.
    CompoundComparison {
        comparisons: Vec<Node>,
    },
    TernaryOperator {
        condition: Box<Node>,
        then_expr: Box<Node>,
        else_expr: Box<Node>,
    },
    /// Plain (`op == None`) or augmented assignment.
    AssignmentExpression {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        op: Option<BinaryOp>,
        target: Box<Node>,
        value: Box<Node>,
    },
    FunctionCall {
        function: Box<Node>,
        arguments: Vec<Node>,
    },
    MemberAccess {
        object: Box<Node>,
        member: Box<Node>,
    },
    /// `target[i, j, ...]`; the index count is fixed at construction.
    IndexExpression {
        target: Box<Node>,
        indices: Box<[Node]>,
    },
    ArrayLiteral {
        elements: Vec<Node>,
    },
    DictLiteral {
        entries: Vec<Node>,
    },
    KeyValuePair {
        key: Box<Node>,
        value: Box<Node>,
    },
    /// `new T[d1][d2] { init... }`.
    ArrayNew {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element_type: Option<Box<Node>>,
        dimensions: Box<[Node]>,
        initializer: Vec<Node>,
    },
    Lambda {
        parameters: Vec<Node>,
        body: Box<Node>,
    },
    ParenthesizedExpression {
        expression: Box<Node>,
    },

    // Statements
    ExpressionStatement {
        expression: Box<Node>,
    },
    IfStatement {
        condition: Box<Node>,
        then_branch: Box<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_branch: Option<Box<Node>>,
    },
    WhileLoop {
        condition: Box<Node>,
        body: Box<Node>,
    },
    ForEachLoop {
        variable: Box<Node>,
        iterable: Box<Node>,
        body: Box<Node>,
    },
    ReturnStatement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<Node>>,
    },
    BreakStatement,
    ContinueStatement,
    EmptyStatement,
    CompoundStatement {
        statements: Vec<Node>,
    },
    FunctionDefinition {
        name: Box<Node>,
        parameters: Vec<Node>,
        body: Box<Node>,
    },
    ProgramEntryPoint {
        body: Vec<Node>,
    },
}

impl NodeKind {
    /// Wire name of the kind, as written in the `"type"` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identifier { .. } => "identifier",
            Self::IntegerLiteral { .. } => "integer_literal",
            Self::FloatLiteral { .. } => "float_literal",
            Self::StringLiteral { .. } => "string_literal",
            Self::BoolLiteral { .. } => "bool_literal",
            Self::NullLiteral => "null_literal",
            Self::BinaryExpression { .. } => "binary_expression",
            Self::UnaryExpression { .. } => "unary_expression",
            Self::CompoundComparison { .. } => "compound_comparison",
            Self::TernaryOperator { .. } => "ternary_operator",
            Self::AssignmentExpression { .. } => "assignment_expression",
            Self::FunctionCall { .. } => "function_call",
            Self::MemberAccess { .. } => "member_access",
            Self::IndexExpression { .. } => "index_expression",
            Self::ArrayLiteral { .. } => "array_literal",
            Self::DictLiteral { .. } => "dict_literal",
            Self::KeyValuePair { .. } => "key_value_pair",
            Self::ArrayNew { .. } => "array_new",
            Self::Lambda { .. } => "lambda",
            Self::ParenthesizedExpression { .. } => "parenthesized_expression",
            Self::ExpressionStatement { .. } => "expression_statement",
            Self::IfStatement { .. } => "if_statement",
            Self::WhileLoop { .. } => "while_loop",
            Self::ForEachLoop { .. } => "for_each_loop",
            Self::ReturnStatement { .. } => "return_statement",
            Self::BreakStatement => "break_statement",
            Self::ContinueStatement => "continue_statement",
            Self::EmptyStatement => "empty_statement",
            Self::CompoundStatement { .. } => "compound_statement",
            Self::FunctionDefinition { .. } => "function_definition",
            Self::ProgramEntryPoint { .. } => "program_entry_point",
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::ExpressionStatement { .. }
                | Self::IfStatement { .. }
                | Self::WhileLoop { .. }
                | Self::ForEachLoop { .. }
                | Self::ReturnStatement { .. }
                | Self::BreakStatement
                | Self::ContinueStatement
                | Self::EmptyStatement
                | Self::CompoundStatement { .. }
                | Self::FunctionDefinition { .. }
                | Self::ProgramEntryPoint { .. }
        )
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }

    pub fn int(value: i64) -> Self {
        Self::IntegerLiteral { value }
    }

    pub fn float(value: f64) -> Self {
        Self::FloatLiteral { value }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLiteral {
            value: value.into(),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self::BoolLiteral { value }
    }

    pub fn binary(left: Node, op: BinaryOp, right: Node) -> Self {
        Self::BinaryExpression {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        Self::UnaryExpression {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn ternary(condition: Node, then_expr: Node, else_expr: Node) -> Self {
        Self::TernaryOperator {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    pub fn assign(target: Node, value: Node) -> Self {
        Self::AssignmentExpression {
            op: None,
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn augmented_assign(target: Node, op: BinaryOp, value: Node) -> Self {
        Self::AssignmentExpression {
            op: Some(op),
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn call(function: Node, arguments: Vec<Node>) -> Self {
        Self::FunctionCall {
            function: Box::new(function),
            arguments,
        }
    }

    pub fn member(object: Node, member: Node) -> Self {
        Self::MemberAccess {
            object: Box::new(object),
            member: Box::new(member),
        }
    }

    pub fn index(target: Node, indices: Vec<Node>) -> Self {
        Self::IndexExpression {
            target: Box::new(target),
            indices: indices.into_boxed_slice(),
        }
    }

    pub fn paren(expression: Node) -> Self {
        Self::ParenthesizedExpression {
            expression: Box::new(expression),
        }
    }

    pub fn expr_stmt(expression: Node) -> Self {
        Self::ExpressionStatement {
            expression: Box::new(expression),
        }
    }

    pub fn if_stmt(condition: Node, then_branch: Node, else_branch: Option<Node>) -> Self {
        Self::IfStatement {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn while_loop(condition: Node, body: Node) -> Self {
        Self::WhileLoop {
            condition: Box::new(condition),
            body: Box::new(body),
        }
    }

    pub fn for_each(variable: Node, iterable: Node, body: Node) -> Self {
        Self::ForEachLoop {
            variable: Box::new(variable),
            iterable: Box::new(iterable),
            body: Box::new(body),
        }
    }

    pub fn return_stmt(value: Option<Node>) -> Self {
        Self::ReturnStatement {
            value: value.map(Box::new),
        }
    }

    pub fn block(statements: Vec<Node>) -> Self {
        Self::CompoundStatement { statements }
    }

    pub fn function(name: Node, parameters: Vec<Node>, body: Node) -> Self {
        Self::FunctionDefinition {
            name: Box::new(name),
            parameters,
            body: Box::new(body),
        }
    }

    pub fn program(body: Vec<Node>) -> Self {
        Self::ProgramEntryPoint { body }
    }
}
