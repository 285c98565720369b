//! Syntax tree to linked token list.
//!
//! The walk is a single recursive pass over the concrete tree:
//!
//! - leaves and stop nodes become one token (whitespace-only text becomes none)
//! - binary and ternary operator nodes collect one group per child, register
//!   groups in operand slots via the language's field mapping, adopt the first
//!   one-token operator group as their operator and link the slots to it
//! - unary operator nodes are flattened, then linked right of a leading
//!   operator or left of a trailing one
//! - everything else just recurses
//!
//! Links are first-write-wins, so inner operators keep their operands when an
//! enclosing operator later claims the whole subtree.

use std::borrow::Cow;

use meaning_tree::{ByteSpan, IdAllocator, TokenId};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::TokenizeError;
use crate::language::{Leaf, OperatorTable, TokenizerLanguage, split_ancestor_mapping};
use crate::list::{TokenGroup, TokenList};
use crate::syntax::{SyntaxChild, SyntaxNode};
use crate::token::{Arity, OperandPosition, Token, TokenType};

/// Operand groups of one operator node, indexed by [`OperandPosition`].
type Slots = [Vec<TokenGroup>; 3];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    /// Keep formatting as pseudo tokens: one `" "` per horizontal run and
    /// one separator per newline.
    pub navigable: bool,
    /// Parse the code exactly as given, without [`TokenizerLanguage::prepare`].
    pub skip_preparations: bool,
}

/// Where a node sits in its parent.
#[derive(Debug, Clone, Copy, Default)]
struct Position<'p> {
    field: Option<&'static str>,
    parent_kind: Option<&'p str>,
}

/// Tokenize an already parsed tree.
pub fn collect_tokens<T, N>(
    table: &T,
    root: N,
    source: &str,
    ids: &IdAllocator,
    navigable: bool,
) -> TokenList
where
    T: OperatorTable + ?Sized,
    N: SyntaxNode,
{
    let mut collector = Collector {
        table,
        ids,
        source,
        navigable,
        tokens: TokenList::new(),
    };
    collector.collect(root, Position::default(), true, None);
    collector.tokens
}

struct Collector<'a, T: ?Sized> {
    table: &'a T,
    ids: &'a IdAllocator,
    source: &'a str,
    navigable: bool,
    tokens: TokenList,
}

impl<T: OperatorTable + ?Sized> Collector<'_, T> {
    fn collect<N: SyntaxNode>(
        &mut self,
        node: N,
        at: Position<'_>,
        detect: bool,
        parent: Option<&mut Slots>,
    ) -> TokenGroup {
        let start = self.tokens.len();
        let children = node.children();

        if children.is_empty() || self.table.is_stop_node(node.kind()) {
            self.leaf(node, at);
        } else {
            match self.table.arity_of(node.kind()).filter(|_| detect) {
                Some(Arity::Binary | Arity::Ternary) => self.operator(node, &children, at, parent),
                Some(Arity::Unary) => self.unary(node, at),
                None => self.descend(node, &children),
            }
        }

        TokenGroup::new(start, self.tokens.len())
    }

    fn leaf<N: SyntaxNode>(&mut self, node: N, at: Position<'_>) {
        let source = self.source;
        let text = node.text(source);
        if text.chars().all(char::is_whitespace) {
            return;
        }

        let leaf = Leaf {
            kind: node.kind(),
            text,
            span: ByteSpan::from(node.byte_range()),
            field: at.field,
            parent_kind: at.parent_kind,
        };
        let mut token = self.table.recognize_token(&leaf, self.ids);
        if token.span.is_none() {
            token.span = Some(leaf.span);
        }
        self.tokens.push(token);
    }

    fn descend<N: SyntaxNode>(&mut self, node: N, children: &[SyntaxChild<N>]) {
        let kind = node.kind();
        let mut prev_end = None;
        for child in children {
            self.gap(&mut prev_end, child.node);
            let at = Position {
                field: child.field,
                parent_kind: Some(kind),
            };
            self.collect(child.node, at, true, None);
        }
    }

    fn operator<N: SyntaxNode>(
        &mut self,
        node: N,
        children: &[SyntaxChild<N>],
        at: Position<'_>,
        mut parent: Option<&mut Slots>,
    ) {
        let kind = node.kind();
        let mut slots = Slots::default();
        let mut operator: Option<TokenId> = None;
        let mut prev_end = None;

        for child in children {
            self.gap(&mut prev_end, child.node);
            let child_at = Position {
                field: child.field,
                parent_kind: Some(kind),
            };
            let group = self.collect(child.node, child_at, true, Some(&mut slots));

            for position in OperandPosition::ALL {
                let Some(mapping) = self.table.field_name_by_operand_pos(position, kind) else {
                    continue;
                };
                match split_ancestor_mapping(mapping) {
                    None => {
                        if child.field == Some(mapping) {
                            slots[position.slot()].push(group);
                        }
                    }
                    Some((field, child_kind)) => {
                        if at.field == Some(field) && child.node.kind() == child_kind {
                            if let Some(outer) = parent.as_deref_mut() {
                                outer[position.slot()].push(group);
                            }
                        }
                    }
                }
            }

            if operator.is_none() {
                operator = group
                    .single(&self.tokens)
                    .filter(|token| token.is_operator())
                    .map(|token| token.id);
            }
        }

        let Some(operator) = operator else {
            trace!(kind, "operator node has no single operator token, leaving operands unlinked");
            return;
        };
        for position in OperandPosition::ALL {
            for group in &slots[position.slot()] {
                group.set_metadata(&mut self.tokens, operator, position);
            }
        }
    }

    fn unary<N: SyntaxNode>(&mut self, node: N, at: Position<'_>) {
        let group = self.collect(node, at, false, None);
        let semantic: Vec<usize> = group
            .range()
            .filter(|&index| !self.tokens[index].is_pseudo())
            .collect();
        let (Some(&first), Some(&last)) = (semantic.first(), semantic.last()) else {
            return;
        };

        if self.tokens[first].is_operator() {
            let operator = self.tokens[first].id;
            TokenGroup::new(first + 1, group.stop).set_metadata(
                &mut self.tokens,
                operator,
                OperandPosition::Right,
            );
        } else if self.tokens[last].is_operator() {
            let operator = self.tokens[last].id;
            TokenGroup::new(group.start, last).set_metadata(
                &mut self.tokens,
                operator,
                OperandPosition::Left,
            );
        } else {
            trace!(kind = node.kind(), "unary node has no operator at either end");
        }
    }

    /// Emit formatting between the previous child and `next`.
    fn gap<N: SyntaxNode>(&mut self, prev_end: &mut Option<usize>, next: N) {
        let range = next.byte_range();
        if let Some(end) = *prev_end {
            if self.navigable && end < range.start {
                self.whitespace(end, range.start);
            }
        }
        *prev_end = Some(prev_end.map_or(range.end, |end| end.max(range.end)));
    }

    fn whitespace(&mut self, start: usize, end: usize) {
        let source = self.source;
        let Some(text) = source.get(start..end) else {
            return;
        };
        let mut run = start;
        for (offset, ch) in text.char_indices() {
            if ch == '\n' {
                let at = start + offset;
                self.horizontal(run, at);
                let newline = Token::pseudo(self.ids, "\n", TokenType::Separator)
                    .with_span(ByteSpan::new(at, 1));
                self.tokens.push(newline);
                run = at + 1;
            }
        }
        self.horizontal(run, end);
    }

    fn horizontal(&mut self, start: usize, end: usize) {
        let source = self.source;
        let Some(text) = source.get(start..end).filter(|t| !t.is_empty()) else {
            return;
        };
        let value = match text.trim() {
            "" => " ",
            other => other,
        };
        let token = Token::pseudo(self.ids, value, TokenType::Unknown)
            .with_span(ByteSpan::new(start, end - start));
        self.tokens.push(token);
    }
}

/// Parses source with a [`TokenizerLanguage`] and tokenizes the result.
///
/// Holds no per-call state, so one tokenizer may serve many calls.
pub struct Tokenizer<'a> {
    language: &'a dyn TokenizerLanguage,
    ids: &'a IdAllocator,
    options: TokenizerOptions,
}

impl<'a> Tokenizer<'a> {
    pub fn new(language: &'a dyn TokenizerLanguage, ids: &'a IdAllocator) -> Self {
        Self {
            language,
            ids,
            options: TokenizerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TokenizerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> TokenizerOptions {
        self.options
    }

    pub fn language(&self) -> &'a dyn TokenizerLanguage {
        self.language
    }

    pub fn tokenize(&self, code: &str) -> Result<TokenList, TokenizeError> {
        let source = if self.options.skip_preparations {
            Cow::Borrowed(code)
        } else {
            self.language.prepare(code)
        };

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.language.grammar())
            .map_err(|err| TokenizeError::Parse(err.to_string()))?;
        let tree = parser
            .parse(source.as_ref(), None)
            .ok_or_else(|| TokenizeError::Parse("failed to parse".into()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(TokenizeError::Parse(format!(
                "syntax error in {} source",
                self.language.name()
            )));
        }

        Ok(collect_tokens(
            self.language,
            root,
            &source,
            self.ids,
            self.options.navigable,
        ))
    }

    /// [`tokenize`](Self::tokenize), with any failure reported as `None`.
    pub fn try_tokenize(&self, code: &str) -> Option<TokenList> {
        match self.tokenize(code) {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                debug!(language = self.language.name(), %err, "tokenize failed");
                None
            }
        }
    }
}
