//! Tokens from a meaning tree instead of a concrete syntax tree.
//!
//! Operand groups come straight from node structure, so no field tables are
//! needed; the language only says how each construct is spelled. Tokens carry
//! the value tag and byte span of the node they stand for.

use meaning_tree::{BinaryOp, IdAllocator, MeaningTree, Node, NodeKind, TokenId, UnaryOp};
use tracing::debug;

use crate::error::TokenizeError;
use crate::list::{TokenGroup, TokenList};
use crate::token::{OperandPosition, OperatorInfo, Token, TokenType};

/// How a conditional expression is written.
#[derive(Debug, Clone)]
pub struct TernarySpelling {
    /// The two keyword or punctuation fragments, in source order.
    pub fragments: [&'static str; 2],
    /// `c ? a : b` when true, `a if c else b` when false.
    pub condition_first: bool,
    pub info: OperatorInfo,
}

/// Spelling hooks for [`ExtendedTokenizer`].
pub trait ExtendedLanguage: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the language has no such operator.
    fn binary(&self, op: BinaryOp) -> Option<(&'static str, OperatorInfo)>;

    fn unary(&self, op: UnaryOp) -> Option<(&'static str, OperatorInfo)>;

    /// Plain (`None`) or augmented assignment operator.
    fn assignment(&self, op: Option<BinaryOp>) -> Option<(&'static str, OperatorInfo)>;

    fn ternary(&self) -> TernarySpelling;

    fn member(&self) -> (&'static str, OperatorInfo);

    /// Metadata for the `(`/`)` pair of a call.
    fn call(&self) -> OperatorInfo;

    /// Metadata for the `[`/`]` pair of an index.
    fn index(&self) -> OperatorInfo;

    fn literal(&self, kind: &NodeKind) -> Option<String> {
        match kind {
            NodeKind::IntegerLiteral { value } => Some(value.to_string()),
            NodeKind::FloatLiteral { value } => Some(format!("{value:?}")),
            NodeKind::StringLiteral { value } => Some(format!("{value:?}")),
            NodeKind::BoolLiteral { value } => Some(value.to_string()),
            NodeKind::NullLiteral => Some("null".into()),
            _ => None,
        }
    }
}

pub struct ExtendedTokenizer<'a> {
    language: &'a dyn ExtendedLanguage,
    ids: &'a IdAllocator,
}

impl<'a> ExtendedTokenizer<'a> {
    pub fn new(language: &'a dyn ExtendedLanguage, ids: &'a IdAllocator) -> Self {
        Self { language, ids }
    }

    /// Tokenize the expression a tree holds.
    ///
    /// A program made of a single expression statement is unwrapped to that
    /// expression; any other statement is rejected.
    pub fn tokenize_extended(&self, tree: &MeaningTree) -> Result<TokenList, TokenizeError> {
        self.tokenize_node(expression_of(tree.root()))
    }

    pub fn tokenize_node(&self, node: &Node) -> Result<TokenList, TokenizeError> {
        let mut emitter = Emitter {
            language: self.language,
            ids: self.ids,
            tokens: TokenList::new(),
        };
        emitter.expr(node)?;
        Ok(emitter.tokens)
    }

    pub fn try_tokenize_extended(&self, tree: &MeaningTree) -> Option<TokenList> {
        match self.tokenize_extended(tree) {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                debug!(language = self.language.name(), %err, "extended tokenize failed");
                None
            }
        }
    }
}

fn expression_of(root: &Node) -> &Node {
    match &root.kind {
        NodeKind::ProgramEntryPoint { body } if body.len() == 1 => expression_of(&body[0]),
        NodeKind::ExpressionStatement { expression } => expression,
        _ => root,
    }
}

struct Emitter<'a> {
    language: &'a dyn ExtendedLanguage,
    ids: &'a IdAllocator,
    tokens: TokenList,
}

impl Emitter<'_> {
    fn expr(&mut self, node: &Node) -> Result<TokenGroup, TokenizeError> {
        let start = self.tokens.len();
        match &node.kind {
            NodeKind::Identifier { name } => {
                self.leaf(node, name.clone(), TokenType::Identifier);
            }
            NodeKind::IntegerLiteral { .. }
            | NodeKind::FloatLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::NullLiteral => {
                let text = self
                    .language
                    .literal(&node.kind)
                    .ok_or_else(|| self.unsupported(node))?;
                self.leaf(node, text, TokenType::Const);
            }
            NodeKind::BinaryExpression { op, left, right } => {
                let (text, info) = self
                    .language
                    .binary(*op)
                    .ok_or_else(|| self.unsupported(node))?;
                self.infix(node, left, text, info, right)?;
            }
            NodeKind::AssignmentExpression { op, target, value } => {
                let (text, info) = self
                    .language
                    .assignment(*op)
                    .ok_or_else(|| self.unsupported(node))?;
                self.infix(node, target, text, info, value)?;
            }
            NodeKind::UnaryExpression { op, operand } => {
                let (text, info) = self
                    .language
                    .unary(*op)
                    .ok_or_else(|| self.unsupported(node))?;
                if op.is_postfix() {
                    let operand = self.expr(operand)?;
                    let operator = self.operator(node, Token::operator(self.ids, text, info));
                    operand.set_metadata(&mut self.tokens, operator, OperandPosition::Left);
                } else {
                    let operator = self.operator(node, Token::operator(self.ids, text, info));
                    let operand = self.expr(operand)?;
                    operand.set_metadata(&mut self.tokens, operator, OperandPosition::Right);
                }
            }
            NodeKind::CompoundComparison { comparisons } => self.chain(node, comparisons)?,
            NodeKind::TernaryOperator {
                condition,
                then_expr,
                else_expr,
            } => {
                let spelling = self.language.ternary();
                let (first, middle) = if spelling.condition_first {
                    (condition, then_expr)
                } else {
                    (then_expr, condition)
                };
                let [open, close] = spelling.fragments;
                let first = self.expr(first)?;
                let operator = self.operator(
                    node,
                    Token::complex_operator(self.ids, spelling.info.clone(), &[open, close], 0),
                );
                let middle = self.expr(middle)?;
                self.push(Token::complex_operator(self.ids, spelling.info, &[open, close], 1));
                let last = self.expr(else_expr)?;

                first.set_metadata(&mut self.tokens, operator, OperandPosition::Left);
                middle.set_metadata(&mut self.tokens, operator, OperandPosition::Center);
                last.set_metadata(&mut self.tokens, operator, OperandPosition::Right);
            }
            NodeKind::FunctionCall {
                function,
                arguments,
            } => {
                let callee = self.expr(function)?;
                if let Some(token) = self.tokens.token_mut(callee.start).filter(|_| callee.len() == 1) {
                    if token.token_type == TokenType::Identifier {
                        token.token_type = TokenType::CallableIdentifier;
                    }
                }
                let info = self.language.call();
                let operator =
                    self.operator(node, Token::complex_operator(self.ids, info.clone(), &["(", ")"], 0));
                let args = self.separated(arguments)?;
                self.push(Token::complex_operator(self.ids, info, &["(", ")"], 1));

                callee.set_metadata(&mut self.tokens, operator, OperandPosition::Left);
                args.set_metadata(&mut self.tokens, operator, OperandPosition::Right);
            }
            NodeKind::MemberAccess { object, member } => {
                let (text, info) = self.language.member();
                self.infix(node, object, text, info, member)?;
            }
            NodeKind::IndexExpression { target, indices } => {
                let target = self.expr(target)?;
                let info = self.language.index();
                let operator =
                    self.operator(node, Token::complex_operator(self.ids, info.clone(), &["[", "]"], 0));
                let indices = self.separated(indices)?;
                self.push(Token::complex_operator(self.ids, info, &["[", "]"], 1));

                target.set_metadata(&mut self.tokens, operator, OperandPosition::Left);
                indices.set_metadata(&mut self.tokens, operator, OperandPosition::Right);
            }
            NodeKind::ParenthesizedExpression { expression } => {
                self.push(Token::new(self.ids, "(", TokenType::OpeningBrace));
                self.expr(expression)?;
                self.push(Token::new(self.ids, ")", TokenType::ClosingBrace));
            }
            NodeKind::ArrayLiteral { elements } => {
                self.push(Token::new(self.ids, "[", TokenType::OpeningBrace));
                self.separated(elements)?;
                self.push(Token::new(self.ids, "]", TokenType::ClosingBrace));
            }
            NodeKind::DictLiteral { entries } => {
                self.push(Token::new(self.ids, "{", TokenType::OpeningBrace));
                self.separated(entries)?;
                self.push(Token::new(self.ids, "}", TokenType::ClosingBrace));
            }
            NodeKind::KeyValuePair { key, value } => {
                self.expr(key)?;
                self.push(Token::new(self.ids, ":", TokenType::Separator));
                self.expr(value)?;
            }
            NodeKind::ArrayNew { .. }
            | NodeKind::Lambda { .. }
            | NodeKind::ExpressionStatement { .. }
            | NodeKind::IfStatement { .. }
            | NodeKind::WhileLoop { .. }
            | NodeKind::ForEachLoop { .. }
            | NodeKind::ReturnStatement { .. }
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::EmptyStatement
            | NodeKind::CompoundStatement { .. }
            | NodeKind::FunctionDefinition { .. }
            | NodeKind::ProgramEntryPoint { .. } => return Err(self.unsupported(node)),
        }
        Ok(TokenGroup::new(start, self.tokens.len()))
    }

    fn infix(
        &mut self,
        node: &Node,
        left: &Node,
        text: &str,
        info: OperatorInfo,
        right: &Node,
    ) -> Result<(), TokenizeError> {
        let left = self.expr(left)?;
        let operator = self.operator(node, Token::operator(self.ids, text, info));
        let right = self.expr(right)?;
        left.set_metadata(&mut self.tokens, operator, OperandPosition::Left);
        right.set_metadata(&mut self.tokens, operator, OperandPosition::Right);
        Ok(())
    }

    /// `a < b < c`: each link after the first reuses the previous right
    /// operand, which keeps its first link.
    fn chain(&mut self, node: &Node, comparisons: &[Node]) -> Result<(), TokenizeError> {
        let mut previous: Option<TokenGroup> = None;
        for comparison in comparisons {
            let NodeKind::BinaryExpression { op, left, right } = &comparison.kind else {
                return Err(self.unsupported(node));
            };
            let (text, info) = self
                .language
                .binary(*op)
                .ok_or_else(|| self.unsupported(comparison))?;
            let left = match previous {
                Some(group) => group,
                None => self.expr(left)?,
            };
            let operator = self.operator(comparison, Token::operator(self.ids, text, info));
            let right = self.expr(right)?;
            left.set_metadata(&mut self.tokens, operator, OperandPosition::Left);
            right.set_metadata(&mut self.tokens, operator, OperandPosition::Right);
            previous = Some(right);
        }
        Ok(())
    }

    /// Comma separated items; the group covers all of them.
    fn separated(&mut self, items: &[Node]) -> Result<TokenGroup, TokenizeError> {
        let start = self.tokens.len();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(Token::new(self.ids, ",", TokenType::Comma));
            }
            self.expr(item)?;
        }
        Ok(TokenGroup::new(start, self.tokens.len()))
    }

    fn leaf(&mut self, node: &Node, text: String, token_type: TokenType) {
        let mut token = Token::new(self.ids, text, token_type)
            .with_assigned_value(node.value_tag.clone());
        token.span = node.byte_span();
        self.push(token);
    }

    /// Push the operator token standing for `node`.
    fn operator(&mut self, node: &Node, token: Token) -> TokenId {
        let token = token.with_assigned_value(node.value_tag.clone());
        let id = token.id;
        self.push(token);
        id
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn unsupported(&self, node: &Node) -> TokenizeError {
        TokenizeError::Unsupported(format!("{} in {}", node.kind_name(), self.language.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Associativity, TokenClass};
    use meaning_tree::ByteSpan;

    struct CLike;

    impl ExtendedLanguage for CLike {
        fn name(&self) -> &'static str {
            "c-like"
        }

        fn binary(&self, op: BinaryOp) -> Option<(&'static str, OperatorInfo)> {
            let (text, precedence) = match op {
                BinaryOp::Add => ("+", 4),
                BinaryOp::Mul => ("*", 5),
                BinaryOp::Lt => ("<", 3),
                _ => return None,
            };
            Some((text, OperatorInfo::binary(precedence, Associativity::Left)))
        }

        fn unary(&self, op: UnaryOp) -> Option<(&'static str, OperatorInfo)> {
            match op {
                UnaryOp::Neg => Some(("-", OperatorInfo::prefix(6))),
                UnaryOp::PostIncrement => Some(("++", OperatorInfo::postfix(7))),
                _ => None,
            }
        }

        fn assignment(&self, op: Option<BinaryOp>) -> Option<(&'static str, OperatorInfo)> {
            op.is_none()
                .then(|| ("=", OperatorInfo::binary(0, Associativity::Right)))
        }

        fn ternary(&self) -> TernarySpelling {
            TernarySpelling {
                fragments: ["?", ":"],
                condition_first: true,
                info: OperatorInfo::ternary(1),
            }
        }

        fn member(&self) -> (&'static str, OperatorInfo) {
            (".", OperatorInfo::binary(8, Associativity::Left))
        }

        fn call(&self) -> OperatorInfo {
            OperatorInfo::binary(8, Associativity::Left)
        }

        fn index(&self) -> OperatorInfo {
            OperatorInfo::binary(8, Associativity::Left)
        }
    }

    fn tokenize(node: &Node) -> Result<TokenList, TokenizeError> {
        ExtendedTokenizer::new(&CLike, &IdAllocator::new()).tokenize_node(node)
    }

    fn summary(tokens: &TokenList) -> Vec<(String, Option<(String, OperandPosition)>)> {
        (0..tokens.len())
            .map(|i| {
                (
                    tokens[i].value.clone(),
                    tokens.operator_of(i).map(|(op, pos)| (op.value.clone(), pos)),
                )
            })
            .collect()
    }

    #[test]
    fn test_value_tags_and_spans_are_copied() {
        let ids = IdAllocator::new();
        let mut left = ids.node(NodeKind::ident("a")).with_span(ByteSpan::new(0, 1));
        left.set_value_tag(serde_json::json!(3));
        let mut sum = ids.node(NodeKind::binary(left, BinaryOp::Add, ids.node(NodeKind::int(4))));
        sum.set_value_tag(serde_json::json!(7));

        let tokens = tokenize(&sum).unwrap();
        assert_eq!(tokens[0].assigned_value, Some(serde_json::json!(3)));
        assert_eq!(tokens[0].span, Some(ByteSpan::new(0, 1)));
        assert_eq!(tokens[1].assigned_value, Some(serde_json::json!(7)));
        assert_eq!(tokens[2].token_type, TokenType::Const);
    }

    #[test]
    fn test_ternary_and_postfix() {
        let ids = IdAllocator::new();
        let node = ids.node(NodeKind::ternary(
            ids.node(NodeKind::ident("c")),
            ids.node(NodeKind::unary(UnaryOp::PostIncrement, ids.node(NodeKind::ident("i")))),
            ids.node(NodeKind::unary(UnaryOp::Neg, ids.node(NodeKind::int(1)))),
        ));

        let tokens = tokenize(&node).unwrap();
        let link = |op: &str, pos| Some((op.to_string(), pos));
        assert_eq!(
            summary(&tokens),
            vec![
                ("c".into(), link("?", OperandPosition::Left)),
                ("?".into(), None),
                ("i".into(), link("++", OperandPosition::Left)),
                ("++".into(), link("?", OperandPosition::Center)),
                (":".into(), None),
                ("-".into(), link("?", OperandPosition::Right)),
                ("1".into(), link("-", OperandPosition::Right)),
            ]
        );
        assert!(tokens[4].complex().is_some_and(|c| c.is_closing()));
    }

    #[test]
    fn test_call_marks_callee() {
        let ids = IdAllocator::new();
        let call = ids.node(NodeKind::call(
            ids.node(NodeKind::ident("f")),
            vec![ids.node(NodeKind::ident("x")), ids.node(NodeKind::ident("y"))],
        ));

        let tokens = tokenize(&call).unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["f", "(", "x", ",", "y", ")"]);
        assert_eq!(tokens[0].token_type, TokenType::CallableIdentifier);
        assert_eq!(tokens[3].class, TokenClass::Operand);
        assert_eq!(tokens.operator_of(4).map(|(op, _)| op.id), Some(tokens[1].id));
    }

    #[test]
    fn test_chained_comparison_keeps_first_link() {
        let ids = IdAllocator::new();
        let lt = |a: &str, b: &str| {
            ids.node(NodeKind::binary(
                ids.node(NodeKind::ident(a)),
                BinaryOp::Lt,
                ids.node(NodeKind::ident(b)),
            ))
        };
        let chain = ids.node(NodeKind::CompoundComparison {
            comparisons: vec![lt("a", "b"), lt("b", "c")],
        });

        let tokens = tokenize(&chain).unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["a", "<", "b", "<", "c"]);
        assert_eq!(tokens.operator_of(2).map(|(op, _)| op.id), Some(tokens[1].id));
        assert_eq!(tokens.operator_of(4).map(|(op, _)| op.id), Some(tokens[3].id));
    }

    #[test]
    fn test_statements_are_unsupported() {
        let ids = IdAllocator::new();
        let tree = MeaningTree::new(ids.node(NodeKind::program(vec![
            ids.node(NodeKind::BreakStatement),
            ids.node(NodeKind::ContinueStatement),
        ])));
        let tokenizer = ExtendedTokenizer::new(&CLike, &ids);

        assert!(matches!(
            tokenizer.tokenize_extended(&tree),
            Err(TokenizeError::Unsupported(msg)) if msg.starts_with("program_entry_point")
        ));
        assert!(tokenizer.try_tokenize_extended(&tree).is_none());
    }

    #[test]
    fn test_single_expression_program_is_unwrapped() {
        let ids = IdAllocator::new();
        let tree = MeaningTree::new(ids.node(NodeKind::program(vec![ids.node(NodeKind::expr_stmt(
            ids.node(NodeKind::assign(ids.node(NodeKind::ident("x")), ids.node(NodeKind::int(1)))),
        ))])));

        let tokens = ExtendedTokenizer::new(&CLike, &ids)
            .try_tokenize_extended(&tree)
            .unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["x", "=", "1"]);
    }
}
