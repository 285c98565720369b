//! Python support: operator table, leaf recognition and reader.

pub mod operators;
mod reader;

pub use reader::{PYTHON_READER, PythonReader, read_python, read_python_with};

use std::borrow::Cow;

use meaning_tree::{BinaryOp, IdAllocator, NodeKind, UnaryOp};
use meaning_tree_tokens::{
    Arity, ExtendedLanguage, Leaf, OperandPosition, OperatorInfo, OperatorTable, TernarySpelling,
    Token, TokenType, TokenizerLanguage,
};

use operators as ops;

/// Static instance of the Python language for the registry.
pub static PYTHON: Python = Python;

pub struct Python;

const UNARY_NODES: &[&str] = &["unary_operator", "not_operator", "await"];

const BINARY_NODES: &[&str] = &[
    "binary_operator",
    "boolean_operator",
    "comparison_operator",
    "assignment",
    "augmented_assignment",
    "attribute",
    "subscript",
];

const TERNARY_NODES: &[&str] = &["conditional_expression"];

const STOP_NODES: &[&str] = &["string", "concatenated_string", "is not", "not in"];

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield", "match",
    "case", "print", "exec",
];

impl OperatorTable for Python {
    fn operator_nodes(&self, arity: Arity) -> &'static [&'static str] {
        match arity {
            Arity::Unary => UNARY_NODES,
            Arity::Binary => BINARY_NODES,
            Arity::Ternary => TERNARY_NODES,
        }
    }

    fn stop_nodes(&self) -> &'static [&'static str] {
        STOP_NODES
    }

    fn field_name_by_operand_pos(&self, position: OperandPosition, kind: &str) -> Option<&'static str> {
        use OperandPosition::{Left, Right};
        match (kind, position) {
            (
                "binary_operator" | "boolean_operator" | "assignment" | "augmented_assignment",
                Left,
            ) => Some("left"),
            (
                "binary_operator" | "boolean_operator" | "assignment" | "augmented_assignment",
                Right,
            ) => Some("right"),
            ("attribute", Left) => Some("object"),
            ("attribute", Right) => Some("attribute"),
            ("subscript", Left) => Some("value"),
            ("subscript", Right) => Some("subscript"),
            ("unary_operator" | "not_operator", Right) => Some("argument"),
            _ => None,
        }
    }

    fn recognize_token(&self, leaf: &Leaf<'_>, ids: &IdAllocator) -> Token {
        if let Some(token) = recognize_operator(leaf, ids) {
            return token;
        }

        let token_type = match leaf.kind {
            "identifier" if leaf.field == Some("function") => TokenType::CallableIdentifier,
            "identifier" => TokenType::Identifier,
            "integer" | "float" | "string" | "concatenated_string" | "true" | "false" | "none"
            | "ellipsis" => TokenType::Const,
            "(" | "[" | "{" => TokenType::OpeningBrace,
            ")" | "]" | "}" => TokenType::ClosingBrace,
            "," => TokenType::Comma,
            ":" | ";" => TokenType::Separator,
            kind if KEYWORDS.contains(&kind) => TokenType::Keyword,
            _ => TokenType::Unknown,
        };
        Token::new(ids, leaf.text, token_type)
    }
}

/// Operator tokens are recognized by their parent node; the same text is
/// a different operator (or none) elsewhere.
fn recognize_operator(leaf: &Leaf<'_>, ids: &IdAllocator) -> Option<Token> {
    let parent = leaf.parent_kind?;
    let text = leaf.text;
    let token = match parent {
        "binary_operator" | "boolean_operator" | "comparison_operator" => {
            Token::operator(ids, text, ops::binary_info(ops::binary_op(text)?))
        }
        "unary_operator" | "not_operator" | "await" => {
            Token::operator(ids, text, ops::unary_info(ops::unary_op(text)?))
        }
        "assignment" if text == "=" => Token::operator(ids, text, ops::assignment_info()),
        "augmented_assignment" => {
            ops::augmented_op(text)?;
            Token::operator(ids, text, ops::assignment_info())
        }
        "attribute" if text == "." => Token::operator(ids, text, ops::access_info()),
        "subscript" => {
            let index = ["[", "]"].iter().position(|f| *f == text)?;
            Token::complex_operator(ids, ops::access_info(), &["[", "]"], index)
        }
        "conditional_expression" => {
            let index = ["if", "else"].iter().position(|f| *f == text)?;
            Token::complex_operator(ids, ops::conditional_info(), &["if", "else"], index)
        }
        _ => return None,
    };
    Some(token)
}

impl TokenizerLanguage for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn grammar(&self) -> tree_sitter::Language {
        arborium_python::language().into()
    }

    /// Normalize line endings so byte spans line up with `\n` separators.
    fn prepare<'a>(&self, code: &'a str) -> Cow<'a, str> {
        if code.contains('\r') {
            Cow::Owned(code.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(code)
        }
    }
}

impl ExtendedLanguage for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn binary(&self, op: BinaryOp) -> Option<(&'static str, OperatorInfo)> {
        Some((ops::binary_spelling(op)?, ops::binary_info(op)))
    }

    fn unary(&self, op: UnaryOp) -> Option<(&'static str, OperatorInfo)> {
        Some((ops::unary_spelling(op)?, ops::unary_info(op)))
    }

    fn assignment(&self, op: Option<BinaryOp>) -> Option<(&'static str, OperatorInfo)> {
        let text = match op {
            None => "=",
            Some(op) => ops::augmented_spelling(op)?,
        };
        Some((text, ops::assignment_info()))
    }

    fn ternary(&self) -> TernarySpelling {
        TernarySpelling {
            fragments: ["if", "else"],
            condition_first: false,
            info: ops::conditional_info(),
        }
    }

    fn member(&self) -> (&'static str, OperatorInfo) {
        (".", ops::access_info())
    }

    fn call(&self) -> OperatorInfo {
        ops::call_info()
    }

    fn index(&self) -> OperatorInfo {
        ops::access_info()
    }

    fn literal(&self, kind: &NodeKind) -> Option<String> {
        match kind {
            NodeKind::BoolLiteral { value: true } => Some("True".into()),
            NodeKind::BoolLiteral { value: false } => Some("False".into()),
            NodeKind::NullLiteral => Some("None".into()),
            NodeKind::StringLiteral { value } => Some(quote(value)),
            NodeKind::IntegerLiteral { value } => Some(value.to_string()),
            NodeKind::FloatLiteral { value } => Some(format!("{value:?}")),
            _ => None,
        }
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}
