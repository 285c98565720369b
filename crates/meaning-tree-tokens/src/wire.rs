//! JSON wire format for tokens.
//!
//! ```json
//! {"type": "tokens", "items": [
//!   {"type": "operand", "id": 0, "value": "a", "token_type": "IDENTIFIER",
//!    "is_pseudo": false, "operand_of": 1, "operand_pos": "LEFT", "byte_pos": [0, 1]},
//!   {"type": "operator", "id": 1, "value": "+", "token_type": "OPERATOR", ...}
//! ]}
//! ```
//!
//! The `type` field names the token class; which optional fields are
//! present follows from it.

use meaning_tree::{ByteSpan, IdAllocator, TokenId};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TokenizeError;
use crate::list::TokenList;
use crate::token::{
    Arity, Associativity, ComplexOperator, OpType, OperandPosition, OperatorInfo, Token,
    TokenClass, TokenPosition, TokenType,
};

#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    #[serde(rename = "type")]
    class: String,
    id: TokenId,
    value: String,
    token_type: TokenType,
    #[serde(default)]
    is_pseudo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    precedence: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    associativity: Option<Associativity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arity: Option<Arity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_strict_order: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_evaluated_operand: Option<OperandPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    optype_metadata: Option<OpType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_position: Option<TokenPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fragment_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operand_of: Option<TokenId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operand_pos: Option<OperandPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    byte_pos: Option<ByteSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assigned_value: Option<Value>,
}

impl TokenRecord {
    fn encode(token: &Token, list: &TokenList) -> Self {
        let link = list.link_of(token.id);
        let mut record = TokenRecord {
            class: class_name(&token.class).to_string(),
            id: token.id,
            value: token.value.clone(),
            token_type: token.token_type,
            is_pseudo: token.is_pseudo(),
            precedence: None,
            associativity: None,
            arity: None,
            is_strict_order: None,
            first_evaluated_operand: None,
            optype_metadata: None,
            token_position: None,
            token_values: None,
            fragment_index: None,
            operand_of: link.map(|l| l.operator),
            operand_pos: link.map(|l| l.position),
            byte_pos: token.span,
            assigned_value: token.assigned_value.clone(),
        };
        if let Some(info) = token.operator_info() {
            record.precedence = Some(info.precedence);
            record.associativity = Some(info.associativity);
            record.arity = Some(info.arity);
            record.is_strict_order = Some(info.is_strict_order);
            record.first_evaluated_operand = info.first_evaluated;
            record.optype_metadata = info.op_type;
            record.token_position = info.position;
        }
        if let Some(complex) = token.complex() {
            record.token_values = Some(complex.fragments.clone());
            record.fragment_index = Some(complex.fragment_index);
        }
        record
    }

    fn decode(self) -> Result<Token, String> {
        let class = match self.class.as_str() {
            "token" => TokenClass::Plain,
            "operand" => TokenClass::Operand,
            "pseudo" => TokenClass::Pseudo,
            "operator" => TokenClass::Operator(self.operator_info()?),
            "complex_operator" => {
                let fragments = self
                    .token_values
                    .clone()
                    .ok_or_else(|| format!("complex operator {} has no token_values", self.id))?;
                let fragment_index = match self.fragment_index {
                    Some(index) => index,
                    None => fragments
                        .iter()
                        .position(|f| *f == self.value)
                        .ok_or_else(|| {
                            format!("{:?} is not a fragment of operator {}", self.value, self.id)
                        })?,
                };
                TokenClass::ComplexOperator(ComplexOperator {
                    info: self.operator_info()?,
                    fragments,
                    fragment_index,
                })
            }
            other => return Err(format!("unknown token type {other:?}")),
        };
        Ok(Token {
            id: self.id,
            value: self.value,
            token_type: self.token_type,
            span: self.byte_pos,
            assigned_value: self.assigned_value,
            class,
        })
    }

    fn operator_info(&self) -> Result<OperatorInfo, String> {
        let missing = |field: &str| format!("operator {} has no {field}", self.id);
        Ok(OperatorInfo {
            precedence: self.precedence.ok_or_else(|| missing("precedence"))?,
            associativity: self.associativity.ok_or_else(|| missing("associativity"))?,
            arity: self.arity.ok_or_else(|| missing("arity"))?,
            is_strict_order: self.is_strict_order.unwrap_or(false),
            position: self.token_position,
            first_evaluated: self.first_evaluated_operand,
            op_type: self.optype_metadata,
        })
    }
}

fn class_name(class: &TokenClass) -> &'static str {
    match class {
        TokenClass::Plain => "token",
        TokenClass::Operand => "operand",
        TokenClass::Operator(_) => "operator",
        TokenClass::ComplexOperator(_) => "complex_operator",
        TokenClass::Pseudo => "pseudo",
    }
}

#[derive(Serialize)]
struct ListOut {
    #[serde(rename = "type")]
    kind: &'static str,
    items: Vec<TokenRecord>,
}

#[derive(Deserialize)]
struct ListIn {
    #[serde(rename = "type")]
    kind: String,
    items: Vec<TokenRecord>,
}

impl Serialize for TokenList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ListOut {
            kind: "tokens",
            items: self.iter().map(|t| TokenRecord::encode(t, self)).collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TokenList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = ListIn::deserialize(deserializer)?;
        if wire.kind != "tokens" {
            return Err(de::Error::custom(format!(
                "expected a token list, got type {:?}",
                wire.kind
            )));
        }

        let mut list = TokenList::new();
        let mut links = Vec::new();
        for record in wire.items {
            if let (Some(operator), Some(position)) = (record.operand_of, record.operand_pos) {
                links.push((record.id, operator, position));
            }
            list.push(record.decode().map_err(de::Error::custom)?);
        }
        for (operand, operator, position) in links {
            list.link(operand, operator, position);
        }
        Ok(list)
    }
}

impl TokenList {
    pub fn to_json(&self) -> Result<String, TokenizeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TokenizeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a token list, advancing `ids` past every id it contains.
    pub fn from_json(json: &str, ids: &IdAllocator) -> Result<Self, TokenizeError> {
        let list: TokenList = serde_json::from_str(json)?;
        for token in &list {
            ids.observe_token_id(token.id);
        }
        Ok(list)
    }

    /// Number of operand links, for consumers checking wire completeness.
    pub fn link_count(&self) -> usize {
        self.links().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::TokenGroup;

    fn sample(ids: &IdAllocator) -> TokenList {
        let mut list = TokenList::new();
        list.push(Token::new(ids, "xs", TokenType::Identifier).with_span(ByteSpan::new(0, 2)));
        let info = OperatorInfo::binary(16, Associativity::Left)
            .strict(OperandPosition::Left)
            .of_type(OpType::Access);
        list.push(Token::complex_operator(ids, info.clone(), &["[", "]"], 0));
        list.push(
            Token::new(ids, "0", TokenType::Const)
                .with_assigned_value(Some(serde_json::json!(0))),
        );
        list.push(Token::complex_operator(ids, info, &["[", "]"], 1));
        list.push(Token::pseudo(ids, "\n", TokenType::Separator));

        let op = list[1].id;
        TokenGroup::new(0, 1).set_metadata(&mut list, op, OperandPosition::Left);
        TokenGroup::new(2, 3).set_metadata(&mut list, op, OperandPosition::Right);
        list
    }

    #[test]
    fn test_wire_shape() {
        let ids = IdAllocator::new();
        let json: Value = serde_json::from_str(&sample(&ids).to_json().unwrap()).unwrap();

        assert_eq!(json["type"], "tokens");
        let items = json["items"].as_array().unwrap();
        assert_eq!(items[0]["type"], "operand");
        assert_eq!(items[0]["operand_of"], 1);
        assert_eq!(items[0]["operand_pos"], "LEFT");
        assert_eq!(items[0]["byte_pos"], serde_json::json!([0, 2]));
        assert_eq!(items[1]["type"], "complex_operator");
        assert_eq!(items[1]["token_values"], serde_json::json!(["[", "]"]));
        assert_eq!(items[1]["first_evaluated_operand"], "LEFT");
        assert_eq!(items[1]["optype_metadata"], "ACCESS");
        assert_eq!(items[1]["token_position"], "INFIX");
        assert_eq!(items[2]["assigned_value"], 0);
        assert_eq!(items[4]["is_pseudo"], true);
        assert!(items[4].get("precedence").is_none());
    }

    #[test]
    fn test_decode_restores_links_and_ids() {
        let ids = IdAllocator::new();
        let list = sample(&ids);
        let json = list.to_json().unwrap();

        let fresh = IdAllocator::new();
        let decoded = TokenList::from_json(&json, &fresh).unwrap();

        assert_eq!(decoded, list);
        assert_eq!(decoded.link_count(), 2);
        assert_eq!(decoded.to_json().unwrap(), json);
        assert_eq!(fresh.next_token_id(), TokenId(5));
    }

    #[test]
    fn test_operator_without_precedence_is_rejected() {
        let ids = IdAllocator::new();
        let json = r#"{"type":"tokens","items":[
            {"type":"operator","id":0,"value":"+","token_type":"OPERATOR","is_pseudo":false}
        ]}"#;

        let err = TokenList::from_json(json, &ids).unwrap_err();
        assert!(matches!(err, TokenizeError::Wire(msg) if msg.contains("precedence")));
    }

    #[test]
    fn test_wrong_envelope_is_rejected() {
        let ids = IdAllocator::new();
        assert!(TokenList::from_json(r#"{"type":"tree","items":[]}"#, &ids).is_err());
    }
}
