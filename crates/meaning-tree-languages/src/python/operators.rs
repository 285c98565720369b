//! Python operator spellings and precedence.
//!
//! Levels follow the Python language reference, lowest first. Higher binds
//! tighter.

use meaning_tree::{BinaryOp, UnaryOp};
use meaning_tree_tokens::{Associativity, OpType, OperandPosition, OperatorInfo};

pub const ASSIGNMENT: i32 = 0;
pub const LAMBDA: i32 = 1;
pub const CONDITIONAL: i32 = 2;
pub const OR: i32 = 3;
pub const AND: i32 = 4;
pub const NOT: i32 = 5;
pub const COMPARISON: i32 = 6;
pub const BIT_OR: i32 = 7;
pub const BIT_XOR: i32 = 8;
pub const BIT_AND: i32 = 9;
pub const SHIFT: i32 = 10;
pub const ADDITIVE: i32 = 11;
pub const MULTIPLICATIVE: i32 = 12;
pub const UNARY: i32 = 13;
pub const POWER: i32 = 14;
pub const AWAIT: i32 = 15;
pub const ACCESS: i32 = 16;

pub fn binary_op(text: &str) -> Option<BinaryOp> {
    let op = match text {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "//" => BinaryOp::FloorDiv,
        "%" => BinaryOp::Mod,
        "**" => BinaryOp::Pow,
        "@" => BinaryOp::MatMul,
        "==" => BinaryOp::Eq,
        "!=" | "<>" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        "is" => BinaryOp::Is,
        "in" => BinaryOp::In,
        "and" => BinaryOp::And,
        "or" => BinaryOp::Or,
        "&" => BinaryOp::BitAnd,
        "|" => BinaryOp::BitOr,
        "^" => BinaryOp::BitXor,
        "<<" => BinaryOp::Shl,
        ">>" => BinaryOp::Shr,
        // `is not` / `not in`, possibly spread over several spaces
        other => match other.split_whitespace().collect::<Vec<_>>()[..] {
            ["is", "not"] => BinaryOp::IsNot,
            ["not", "in"] => BinaryOp::NotIn,
            _ => return None,
        },
    };
    Some(op)
}

pub fn binary_spelling(op: BinaryOp) -> Option<&'static str> {
    let text = match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::FloorDiv => "//",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "**",
        BinaryOp::MatMul => "@",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Is => "is",
        BinaryOp::IsNot => "is not",
        BinaryOp::In => "in",
        BinaryOp::NotIn => "not in",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::Concat => return None,
    };
    Some(text)
}

pub fn binary_info(op: BinaryOp) -> OperatorInfo {
    let (precedence, op_type) = match op {
        BinaryOp::Or => (OR, OpType::Logical),
        BinaryOp::And => (AND, OpType::Logical),
        BinaryOp::BitOr => (BIT_OR, OpType::Bitwise),
        BinaryOp::BitXor => (BIT_XOR, OpType::Bitwise),
        BinaryOp::BitAnd => (BIT_AND, OpType::Bitwise),
        BinaryOp::Shl | BinaryOp::Shr => (SHIFT, OpType::Bitwise),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Concat => (ADDITIVE, OpType::Arithmetic),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod | BinaryOp::MatMul => {
            (MULTIPLICATIVE, OpType::Arithmetic)
        }
        BinaryOp::Pow => {
            return OperatorInfo::binary(POWER, Associativity::Right).of_type(OpType::Arithmetic);
        }
        _ => (COMPARISON, OpType::Comparison),
    };
    let info = OperatorInfo::binary(precedence, Associativity::Left).of_type(op_type);
    if op.is_logical() {
        // short-circuit: the left side always runs first
        info.strict(OperandPosition::Left)
    } else {
        info
    }
}

pub fn unary_op(text: &str) -> Option<UnaryOp> {
    match text {
        "-" => Some(UnaryOp::Neg),
        "+" => Some(UnaryOp::Plus),
        "~" => Some(UnaryOp::BitNot),
        "not" => Some(UnaryOp::Not),
        "await" => Some(UnaryOp::Await),
        _ => None,
    }
}

pub fn unary_spelling(op: UnaryOp) -> Option<&'static str> {
    match op {
        UnaryOp::Neg => Some("-"),
        UnaryOp::Plus => Some("+"),
        UnaryOp::BitNot => Some("~"),
        UnaryOp::Not => Some("not"),
        UnaryOp::Await => Some("await"),
        UnaryOp::Length
        | UnaryOp::PreIncrement
        | UnaryOp::PreDecrement
        | UnaryOp::PostIncrement
        | UnaryOp::PostDecrement => None,
    }
}

pub fn unary_info(op: UnaryOp) -> OperatorInfo {
    match op {
        UnaryOp::Not => OperatorInfo::prefix(NOT).of_type(OpType::Logical),
        UnaryOp::Await => OperatorInfo::prefix(AWAIT),
        UnaryOp::BitNot => OperatorInfo::prefix(UNARY).of_type(OpType::Bitwise),
        _ => OperatorInfo::prefix(UNARY).of_type(OpType::Arithmetic),
    }
}

/// `+=` and friends.
pub fn augmented_op(text: &str) -> Option<BinaryOp> {
    binary_op(text.strip_suffix('=')?).filter(|op| !op.is_comparison() && !op.is_logical())
}

pub fn augmented_spelling(op: BinaryOp) -> Option<&'static str> {
    let text = match op {
        BinaryOp::Add => "+=",
        BinaryOp::Sub => "-=",
        BinaryOp::Mul => "*=",
        BinaryOp::Div => "/=",
        BinaryOp::FloorDiv => "//=",
        BinaryOp::Mod => "%=",
        BinaryOp::Pow => "**=",
        BinaryOp::MatMul => "@=",
        BinaryOp::BitAnd => "&=",
        BinaryOp::BitOr => "|=",
        BinaryOp::BitXor => "^=",
        BinaryOp::Shl => "<<=",
        BinaryOp::Shr => ">>=",
        _ => return None,
    };
    Some(text)
}

pub fn assignment_info() -> OperatorInfo {
    OperatorInfo::binary(ASSIGNMENT, Associativity::Right)
        .strict(OperandPosition::Right)
        .of_type(OpType::Assignment)
}

pub fn access_info() -> OperatorInfo {
    OperatorInfo::binary(ACCESS, Associativity::Left).of_type(OpType::Access)
}

pub fn call_info() -> OperatorInfo {
    OperatorInfo::binary(ACCESS, Associativity::Left).of_type(OpType::Call)
}

pub fn conditional_info() -> OperatorInfo {
    OperatorInfo::ternary(CONDITIONAL)
        .strict(OperandPosition::Center)
        .of_type(OpType::Conditional)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spellings_agree() {
        for text in ["+", "//", "**", "<=", "is not", "not in", "and", ">>"] {
            let op = binary_op(text).unwrap();
            assert_eq!(binary_spelling(op), Some(text));
        }
        assert_eq!(binary_op("not   in"), Some(BinaryOp::NotIn));
        assert_eq!(binary_op("=>"), None);
    }

    #[test]
    fn test_precedence_order() {
        let p = |op| binary_info(op).precedence;
        assert!(p(BinaryOp::Or) < p(BinaryOp::And));
        assert!(p(BinaryOp::And) < p(BinaryOp::Lt));
        assert!(p(BinaryOp::Add) < p(BinaryOp::Mul));
        assert!(p(BinaryOp::Mul) < p(BinaryOp::Pow));
        assert!(unary_info(UnaryOp::Not).precedence < p(BinaryOp::Eq));
        assert!(unary_info(UnaryOp::Neg).precedence > p(BinaryOp::Mul));
        assert_eq!(binary_info(BinaryOp::Pow).associativity, Associativity::Right);
    }

    #[test]
    fn test_augmented() {
        assert_eq!(augmented_op("+="), Some(BinaryOp::Add));
        assert_eq!(augmented_op("//="), Some(BinaryOp::FloorDiv));
        assert_eq!(augmented_op("=="), None);
        assert_eq!(augmented_spelling(BinaryOp::Shl), Some("<<="));
    }
}
