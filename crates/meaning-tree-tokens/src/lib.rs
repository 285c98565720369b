//! Operator-aware tokenization for meaning-tree languages.
//!
//! Source text is parsed with tree-sitter and flattened into a [`TokenList`]
//! in which every operator token knows its operands: each operand token is
//! linked to its operator with a LEFT, CENTER or RIGHT position. Languages
//! describe their operators declaratively through [`OperatorTable`]; the
//! engine in [`tokenizer`] needs no language-specific parsing logic.
//!
//! [`ExtendedTokenizer`] produces the same kind of list from a
//! [`meaning_tree::MeaningTree`], carrying node value tags onto tokens.

pub mod error;
pub mod extended;
pub mod language;
pub mod list;
pub mod syntax;
pub mod token;
pub mod tokenizer;
mod wire;

pub use error::TokenizeError;
pub use extended::{ExtendedLanguage, ExtendedTokenizer, TernarySpelling};
pub use language::{Leaf, OperatorTable, TokenizerLanguage, split_ancestor_mapping};
pub use list::{ChangeAction, ListChange, TokenGroup, TokenList};
pub use syntax::{SyntaxChild, SyntaxNode};
pub use token::{
    Arity, Associativity, ComplexOperator, OpType, OperandLink, OperandPosition, OperatorInfo,
    Token, TokenClass, TokenPosition, TokenType,
};
pub use tokenizer::{Tokenizer, TokenizerOptions, collect_tokens};
