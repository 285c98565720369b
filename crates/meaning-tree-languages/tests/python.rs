//! Python tokenization and reading, end to end through tree-sitter.

#![cfg(feature = "lang-python")]

use meaning_tree::{BinaryOp, IdAllocator, NodeKind, StructureEq};
use meaning_tree_languages::python::operators;
use meaning_tree_languages::{PYTHON, ReadOptions, read_python, read_python_with};
use meaning_tree_tokens::{
    ExtendedTokenizer, OperandPosition, TokenList, TokenType, Tokenizer, TokenizerOptions,
};
use serde_json::json;

fn tokenize(code: &str) -> TokenList {
    let ids = IdAllocator::new();
    Tokenizer::new(&PYTHON, &ids).tokenize(code).unwrap()
}

/// One line per token: value, type and the operator it is linked to.
fn render(tokens: &TokenList) -> String {
    let lines: Vec<String> = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let mut line = format!("{:?} {:?}", token.value, token.token_type);
            if let Some((operator, position)) = tokens.operator_of(index) {
                line.push_str(&format!(" -> {:?} {:?}", operator.value, position));
            }
            line
        })
        .collect();
    lines.join("\n")
}

fn values(tokens: &TokenList) -> Vec<&str> {
    tokens.iter().map(|t| t.value.as_str()).collect()
}

#[test]
fn test_operands_link_to_their_operator() {
    let tokens = tokenize("a + b * c");
    assert_eq!(values(&tokens), ["a", "+", "b", "*", "c"]);

    let link = |i| tokens.operator_of(i).map(|(op, pos)| (op.value.as_str(), pos));
    assert_eq!(link(0), Some(("+", OperandPosition::Left)));
    assert_eq!(link(1), None);
    assert_eq!(link(2), Some(("*", OperandPosition::Left)));
    assert_eq!(link(3), Some(("+", OperandPosition::Right)));
    assert_eq!(link(4), Some(("*", OperandPosition::Right)));
    assert!(tokens.iter().all(|t| t.is_operand()));
}

#[test]
fn test_nested_operators_rendered() {
    let tokens = tokenize("x = a.b + -c");
    insta::assert_snapshot!(render(&tokens), @r#"
    "x" Identifier -> "=" Left
    "=" Operator
    "a" Identifier -> "." Left
    "." Operator -> "+" Left
    "b" Identifier -> "." Right
    "+" Operator -> "=" Right
    "-" Operator -> "+" Right
    "c" Identifier -> "-" Right
    "#);
}

#[test]
fn test_tokenize_is_repeatable() {
    let ids = IdAllocator::new();
    let tokenizer = Tokenizer::new(&PYTHON, &ids);
    let first = tokenizer.tokenize("f(x) + y[0]").unwrap();
    let second = tokenizer.tokenize("f(x) + y[0]").unwrap();

    let shape = |list: &TokenList| -> Vec<(String, TokenType)> {
        list.iter().map(|t| (t.value.clone(), t.token_type)).collect()
    };
    assert_eq!(shape(&first), shape(&second));
    // ids keep counting across calls
    assert_ne!(first[0].id, second[0].id);
}

#[test]
fn test_navigable_keeps_formatting() {
    let ids = IdAllocator::new();
    let options = TokenizerOptions {
        navigable: true,
        ..TokenizerOptions::default()
    };
    let tokens = Tokenizer::new(&PYTHON, &ids)
        .with_options(options)
        .tokenize("x = 1\ny = 2")
        .unwrap();

    assert_eq!(
        values(&tokens),
        ["x", " ", "=", " ", "1", "\n", "y", " ", "=", " ", "2"]
    );
    let newline = &tokens[5];
    assert!(newline.is_pseudo() && newline.is_newline());
    // formatting never becomes an operand
    assert!(tokens.link_of(tokens[1].id).is_none());
    assert_eq!(
        tokens.operator_of(4).map(|(op, pos)| (op.value.as_str(), pos)),
        Some(("=", OperandPosition::Right))
    );
}

#[test]
fn test_unary_operands_sit_right() {
    for code in ["-x", "not a"] {
        let tokens = tokenize(code);
        let (operator, position) = tokens.operator_of(1).unwrap();
        assert_eq!(operator.id, tokens[0].id, "{code}");
        assert_eq!(position, OperandPosition::Right, "{code}");
        assert_eq!(
            operator.operator_info().map(|i| i.precedence),
            Some(if code == "-x" { operators::UNARY } else { operators::NOT })
        );
    }
}

#[test]
fn test_subscript_brackets_are_one_operator() {
    let tokens = tokenize("y[i]");
    assert_eq!(values(&tokens), ["y", "[", "i", "]"]);
    let open = tokens[1].complex().unwrap();
    let close = tokens[3].complex().unwrap();
    assert!(open.is_opening() && close.is_closing());

    let link = |i| tokens.operator_of(i).map(|(op, pos)| (op.id, pos));
    assert_eq!(link(0), Some((tokens[1].id, OperandPosition::Left)));
    assert_eq!(link(2), Some((tokens[1].id, OperandPosition::Right)));
}

#[test]
fn test_unlinkable_nodes_degrade() {
    // comparison and conditional nodes have no operand fields; they
    // tokenize without links instead of failing
    let tokens = tokenize("a < b");
    assert_eq!(values(&tokens), ["a", "<", "b"]);
    assert!(tokens[1].is_operator());
    assert_eq!(tokens.link_count(), 0);

    let tokens = tokenize("x if c else y");
    assert_eq!(values(&tokens), ["x", "if", "c", "else", "y"]);
    assert!(tokens[1].complex().is_some_and(|c| c.is_opening()));
}

#[test]
fn test_syntax_errors() {
    let ids = IdAllocator::new();
    let tokenizer = Tokenizer::new(&PYTHON, &ids);
    assert!(tokenizer.tokenize("a +").is_err());
    assert!(tokenizer.try_tokenize("a +").is_none());
    assert!(tokenizer.try_tokenize("a + 1").is_some());
}

#[test]
fn test_crlf_is_prepared() {
    let ids = IdAllocator::new();
    let options = TokenizerOptions {
        navigable: true,
        ..TokenizerOptions::default()
    };
    let tokens = Tokenizer::new(&PYTHON, &ids)
        .with_options(options)
        .tokenize("a\r\nb")
        .unwrap();
    assert_eq!(values(&tokens), ["a", "\n", "b"]);
}

#[test]
fn test_reader_matches_hand_built_tree() {
    let tree = read_python("total = price * (1 + rate)", &IdAllocator::new()).unwrap();

    let ids = IdAllocator::new();
    let expected = ids.node(NodeKind::program(vec![ids.node(NodeKind::expr_stmt(
        ids.node(NodeKind::assign(
            ids.node(NodeKind::ident("total")),
            ids.node(NodeKind::binary(
                ids.node(NodeKind::ident("price")),
                BinaryOp::Mul,
                ids.node(NodeKind::paren(ids.node(NodeKind::binary(
                    ids.node(NodeKind::int(1)),
                    BinaryOp::Add,
                    ids.node(NodeKind::ident("rate")),
                )))),
            )),
        )),
    ))]));
    assert!(tree.root().structure_eq(&expected));
    assert_eq!(tree.origin_language(), Some("python"));
}

#[test]
fn test_value_tags_reach_tokens() {
    let ids = IdAllocator::new();
    let options = ReadOptions::new().with_value_tag(4..9, json!(3));
    let tree = read_python_with("x = 1 + 2", &ids, &options).unwrap();

    let tokens = ExtendedTokenizer::new(&PYTHON, &ids)
        .tokenize_extended(&tree)
        .unwrap();
    assert_eq!(values(&tokens), ["x", "=", "1", "+", "2"]);
    assert_eq!(tokens[3].assigned_value, Some(json!(3)));
    assert!(tokens[1].assigned_value.is_none());
}

#[test]
fn test_extended_matches_source_tokens() {
    let code = "a if c else b * -d";
    let ids = IdAllocator::new();
    let tree = read_python(code, &ids).unwrap();
    let extended = ExtendedTokenizer::new(&PYTHON, &ids)
        .tokenize_extended(&tree)
        .unwrap();

    assert_eq!(values(&extended), values(&tokenize(code)));
    // the extended list links the ternary the source walk cannot
    let (operator, position) = extended.operator_of(2).unwrap();
    assert_eq!(operator.value, "if");
    assert_eq!(position, OperandPosition::Center);
}

#[test]
fn test_extended_rejects_statements() {
    let ids = IdAllocator::new();
    let tree = read_python("while x:\n    pass\n", &ids).unwrap();
    let extended = ExtendedTokenizer::new(&PYTHON, &ids);
    assert!(extended.tokenize_extended(&tree).is_err());
    assert!(extended.try_tokenize_extended(&tree).is_none());
}
