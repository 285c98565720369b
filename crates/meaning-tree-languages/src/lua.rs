//! Lua operator table and leaf recognition.
//!
//! Precedence follows the Lua 5.4 manual, lowest first.

use meaning_tree::IdAllocator;
use meaning_tree_tokens::{
    Arity, Associativity, Leaf, OpType, OperandPosition, OperatorInfo, OperatorTable, Token,
    TokenType, TokenizerLanguage,
};

/// Static instance of the Lua language for the registry.
pub static LUA: Lua = Lua;

pub struct Lua;

const OR: i32 = 1;
const AND: i32 = 2;
const COMPARISON: i32 = 3;
const BIT_OR: i32 = 4;
const BIT_XOR: i32 = 5;
const BIT_AND: i32 = 6;
const SHIFT: i32 = 7;
const CONCAT: i32 = 8;
const ADDITIVE: i32 = 9;
const MULTIPLICATIVE: i32 = 10;
const UNARY: i32 = 11;
const POWER: i32 = 12;
const ACCESS: i32 = 13;

const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "for", "function", "goto", "if", "in",
    "local", "not", "or", "repeat", "return", "then", "until", "while",
];

fn binary_info(text: &str) -> Option<OperatorInfo> {
    let info = match text {
        "or" => OperatorInfo::binary(OR, Associativity::Left)
            .strict(OperandPosition::Left)
            .of_type(OpType::Logical),
        "and" => OperatorInfo::binary(AND, Associativity::Left)
            .strict(OperandPosition::Left)
            .of_type(OpType::Logical),
        "<" | ">" | "<=" | ">=" | "~=" | "==" => {
            OperatorInfo::binary(COMPARISON, Associativity::Left).of_type(OpType::Comparison)
        }
        "|" => OperatorInfo::binary(BIT_OR, Associativity::Left).of_type(OpType::Bitwise),
        "~" => OperatorInfo::binary(BIT_XOR, Associativity::Left).of_type(OpType::Bitwise),
        "&" => OperatorInfo::binary(BIT_AND, Associativity::Left).of_type(OpType::Bitwise),
        "<<" | ">>" => OperatorInfo::binary(SHIFT, Associativity::Left).of_type(OpType::Bitwise),
        ".." => OperatorInfo::binary(CONCAT, Associativity::Right).of_type(OpType::Arithmetic),
        "+" | "-" => {
            OperatorInfo::binary(ADDITIVE, Associativity::Left).of_type(OpType::Arithmetic)
        }
        "*" | "/" | "//" | "%" => {
            OperatorInfo::binary(MULTIPLICATIVE, Associativity::Left).of_type(OpType::Arithmetic)
        }
        "^" => OperatorInfo::binary(POWER, Associativity::Right).of_type(OpType::Arithmetic),
        _ => return None,
    };
    Some(info)
}

fn unary_info(text: &str) -> Option<OperatorInfo> {
    let op_type = match text {
        "not" => OpType::Logical,
        "-" | "#" => OpType::Arithmetic,
        "~" => OpType::Bitwise,
        _ => return None,
    };
    Some(OperatorInfo::prefix(UNARY).of_type(op_type))
}

fn access_info() -> OperatorInfo {
    OperatorInfo::binary(ACCESS, Associativity::Left).of_type(OpType::Access)
}

impl OperatorTable for Lua {
    fn operator_nodes(&self, arity: Arity) -> &'static [&'static str] {
        match arity {
            Arity::Unary => &["unary_expression"],
            Arity::Binary => &[
                "binary_expression",
                "dot_index_expression",
                "bracket_index_expression",
            ],
            Arity::Ternary => &[],
        }
    }

    fn stop_nodes(&self) -> &'static [&'static str] {
        &["string"]
    }

    fn field_name_by_operand_pos(&self, position: OperandPosition, kind: &str) -> Option<&'static str> {
        match (kind, position) {
            ("binary_expression", OperandPosition::Left) => Some("left"),
            ("binary_expression", OperandPosition::Right) => Some("right"),
            ("dot_index_expression" | "bracket_index_expression", OperandPosition::Left) => {
                Some("table")
            }
            ("dot_index_expression" | "bracket_index_expression", OperandPosition::Right) => {
                Some("field")
            }
            ("unary_expression", OperandPosition::Right) => Some("operand"),
            _ => None,
        }
    }

    fn recognize_token(&self, leaf: &Leaf<'_>, ids: &IdAllocator) -> Token {
        let text = leaf.text;
        let operator = match leaf.parent_kind {
            Some("binary_expression") => binary_info(text),
            Some("unary_expression") => unary_info(text),
            Some("dot_index_expression") if text == "." => Some(access_info()),
            Some("bracket_index_expression") => {
                if let Some(index) = ["[", "]"].iter().position(|f| *f == text) {
                    return Token::complex_operator(ids, access_info(), &["[", "]"], index);
                }
                None
            }
            _ => None,
        };
        if let Some(info) = operator {
            return Token::operator(ids, text, info);
        }

        let token_type = match leaf.kind {
            "identifier" if leaf.field == Some("name") && leaf.parent_kind == Some("function_call") => {
                TokenType::CallableIdentifier
            }
            "identifier" => TokenType::Identifier,
            "nil" | "true" | "false" | "number" | "string" | "vararg_expression" => TokenType::Const,
            "(" | "[" | "{" => TokenType::OpeningBrace,
            ")" | "]" | "}" => TokenType::ClosingBrace,
            "," => TokenType::Comma,
            ";" => TokenType::Separator,
            kind if KEYWORDS.contains(&kind) => TokenType::Keyword,
            _ => TokenType::Unknown,
        };
        Token::new(ids, text, token_type)
    }
}

impl TokenizerLanguage for Lua {
    fn name(&self) -> &'static str {
        "lua"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["lua"]
    }

    fn grammar(&self) -> tree_sitter::Language {
        arborium_lua::language().into()
    }
}
