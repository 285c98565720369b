//! Ordered token storage with operand links kept in a side table.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, Range};

use meaning_tree::TokenId;

use crate::token::{OperandLink, OperandPosition, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Add,
    Remove,
}

/// One mutation of a [`TokenList`], as seen by observers.
#[derive(Debug, Clone, Copy)]
pub struct ListChange<'a> {
    pub index: usize,
    pub token: &'a Token,
    pub action: ChangeAction,
}

type Observer = Box<dyn FnMut(&ListChange<'_>) + Send>;

/// Tokens in source order.
///
/// Operand to operator links live beside the tokens, keyed by the operand's
/// id, so indices stay stable and a link is written at most once.
#[derive(Default)]
pub struct TokenList {
    items: Vec<Token>,
    links: HashMap<TokenId, OperandLink>,
    observers: Vec<Observer>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.items
    }

    pub fn position(&self, id: TokenId) -> Option<usize> {
        self.items.iter().position(|t| t.id == id)
    }

    /// Register a hook fired after every add or remove, in registration order.
    pub fn observe(&mut self, observer: impl FnMut(&ListChange<'_>) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn push(&mut self, token: Token) -> usize {
        let index = self.items.len();
        self.items.push(token);
        self.notify(index, ChangeAction::Add);
        index
    }

    pub fn insert(&mut self, index: usize, token: Token) {
        self.items.insert(index, token);
        self.notify(index, ChangeAction::Add);
    }

    /// Remove the token at `index` along with every link it takes part in,
    /// as operand or as operator.
    pub fn remove(&mut self, index: usize) -> Token {
        let token = self.items.remove(index);
        self.links.remove(&token.id);
        self.links.retain(|_, link| link.operator != token.id);
        let change = ListChange {
            index,
            token: &token,
            action: ChangeAction::Remove,
        };
        for observer in &mut self.observers {
            observer(&change);
        }
        token
    }

    fn notify(&mut self, index: usize, action: ChangeAction) {
        let Some(token) = self.items.get(index) else {
            return;
        };
        let change = ListChange {
            index,
            token,
            action,
        };
        for observer in &mut self.observers {
            observer(&change);
        }
    }

    /// Link `operand` to `operator` unless it is already linked.
    ///
    /// Returns whether the link was written.
    pub fn link(&mut self, operand: TokenId, operator: TokenId, position: OperandPosition) -> bool {
        if self.links.contains_key(&operand) {
            return false;
        }
        self.links.insert(operand, OperandLink { operator, position });
        true
    }

    pub fn link_of(&self, operand: TokenId) -> Option<OperandLink> {
        self.links.get(&operand).copied()
    }

    /// Token the operand at `index` is linked to, with its position.
    pub fn operator_of(&self, index: usize) -> Option<(&Token, OperandPosition)> {
        let link = self.link_of(self.items.get(index)?.id)?;
        let operator = self.items.iter().find(|t| t.id == link.operator)?;
        Some((operator, link.position))
    }

    pub(crate) fn promote(&mut self, index: usize) {
        if let Some(token) = self.items.get_mut(index) {
            token.promote_to_operand();
        }
    }

    pub(crate) fn token_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.items.get_mut(index)
    }

    pub(crate) fn links(&self) -> &HashMap<TokenId, OperandLink> {
        &self.links
    }
}

impl Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl PartialEq for TokenList {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items && self.links == other.links
    }
}

impl fmt::Debug for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenList")
            .field("items", &self.items)
            .field("links", &self.links)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Half-open index range `[start, stop)` over a [`TokenList`].
///
/// Only meaningful while the list it was taken from is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenGroup {
    pub start: usize,
    pub stop: usize,
}

impl TokenGroup {
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    pub fn empty_at(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.stop
    }

    pub fn tokens<'a>(&self, list: &'a TokenList) -> &'a [Token] {
        list.as_slice().get(self.range()).unwrap_or(&[])
    }

    /// Sole token of a one-token group.
    pub fn single<'a>(&self, list: &'a TokenList) -> Option<&'a Token> {
        match self.tokens(list) {
            [token] => Some(token),
            _ => None,
        }
    }

    /// Mark every token in the group as an operand of `operator` at `position`.
    ///
    /// Pseudo tokens are skipped. Tokens that already have a link keep it.
    pub fn set_metadata(&self, list: &mut TokenList, operator: TokenId, position: OperandPosition) {
        for index in self.range() {
            let Some(token) = list.get(index) else {
                break;
            };
            if token.is_pseudo() || token.id == operator {
                continue;
            }
            let id = token.id;
            list.promote(index);
            list.link(id, operator, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Associativity, OperatorInfo, TokenClass, TokenType};
    use meaning_tree::IdAllocator;
    use std::sync::{Arc, Mutex};

    fn abc(ids: &IdAllocator) -> TokenList {
        let mut list = TokenList::new();
        list.push(Token::new(ids, "a", TokenType::Identifier));
        list.push(Token::operator(ids, "+", OperatorInfo::binary(1, Associativity::Left)));
        list.push(Token::new(ids, "b", TokenType::Identifier));
        list
    }

    #[test]
    fn test_hooks_fire_in_registration_order() {
        let ids = IdAllocator::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = TokenList::new();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            list.observe(move |change| {
                seen.lock()
                    .unwrap()
                    .push((tag, change.index, change.token.value.clone(), change.action));
            });
        }

        list.push(Token::new(&ids, "x", TokenType::Identifier));
        list.insert(0, Token::new(&ids, "y", TokenType::Identifier));
        list.remove(1);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("first", 0, "x".to_string(), ChangeAction::Add),
                ("second", 0, "x".to_string(), ChangeAction::Add),
                ("first", 0, "y".to_string(), ChangeAction::Add),
                ("second", 0, "y".to_string(), ChangeAction::Add),
                ("first", 1, "x".to_string(), ChangeAction::Remove),
                ("second", 1, "x".to_string(), ChangeAction::Remove),
            ]
        );
    }

    #[test]
    fn test_first_link_wins() {
        let ids = IdAllocator::new();
        let mut list = abc(&ids);
        let plus = list[1].id;
        let other = ids.next_token_id();

        TokenGroup::new(2, 3).set_metadata(&mut list, plus, OperandPosition::Right);
        TokenGroup::new(2, 3).set_metadata(&mut list, other, OperandPosition::Left);

        let link = list.link_of(list[2].id).unwrap();
        assert_eq!(link.operator, plus);
        assert_eq!(link.position, OperandPosition::Right);
        assert_eq!(list[2].class, TokenClass::Operand);
    }

    #[test]
    fn test_group_skips_its_own_operator() {
        let ids = IdAllocator::new();
        let mut list = abc(&ids);
        let plus = list[1].id;

        TokenGroup::new(0, 3).set_metadata(&mut list, plus, OperandPosition::Left);

        assert!(list.link_of(plus).is_none());
        assert_eq!(list.operator_of(0).map(|(t, _)| t.value.as_str()), Some("+"));
    }

    #[test]
    fn test_single_requires_exactly_one_token() {
        let ids = IdAllocator::new();
        let list = abc(&ids);

        assert_eq!(TokenGroup::new(1, 2).single(&list).map(|t| t.id), Some(list[1].id));
        assert!(TokenGroup::new(0, 2).single(&list).is_none());
        assert!(TokenGroup::empty_at(3).single(&list).is_none());
        assert!(TokenGroup::new(5, 9).tokens(&list).is_empty());
    }

    #[test]
    fn test_removing_operator_drops_its_operand_links() {
        let ids = IdAllocator::new();
        let mut list = abc(&ids);
        let plus = list[1].id;
        TokenGroup::new(0, 1).set_metadata(&mut list, plus, OperandPosition::Left);
        TokenGroup::new(2, 3).set_metadata(&mut list, plus, OperandPosition::Right);
        assert_eq!(list.link_count(), 2);

        list.remove(1);

        assert_eq!(list.link_count(), 0);
        assert!(list.operator_of(0).is_none());
        assert!(list.operator_of(1).is_none());
    }
}
