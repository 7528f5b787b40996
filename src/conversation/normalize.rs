//! Turning caller input into turns.
//!
//! Callers hand messages over in one of three shapes: a single string, a
//! list of strings, or a list of `{role, content}` records. All of them end
//! up as an ordered `Vec<Turn>`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PhiloError, Result};
use crate::types::Turn;

/// One `{role, content}` record as sent by chat front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub role: String,
    pub content: String,
}

impl MessageRecord {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// The accepted input shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MessageInput {
    Text(String),
    Texts(Vec<String>),
    Records(Vec<MessageRecord>),
    #[default]
    Empty,
}

impl MessageInput {
    /// Read loosely-typed JSON input.
    ///
    /// The first element of an array decides its shape. Records missing a
    /// string `role` or `content`, and string lists holding non-strings, are
    /// rejected. Values of any other shape read as [`MessageInput::Empty`].
    pub fn from_json(value: &Value) -> Result<Self> {
        let items = match value {
            Value::String(text) => return Ok(Self::Text(text.clone())),
            Value::Array(items) => items,
            _ => return Ok(Self::Empty),
        };

        match items.first() {
            None => Ok(Self::Empty),
            Some(Value::Object(_)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| record_from_json(index, item))
                .collect::<Result<Vec<_>>>()
                .map(Self::Records),
            Some(Value::String(_)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(text) => Ok(text.clone()),
                    other => Err(PhiloError::Validation(format!(
                        "message {index}: expected a string, got {}",
                        json_kind(other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Texts),
            Some(_) => Ok(Self::Empty),
        }
    }

    /// Convert into turns, preserving order.
    ///
    /// Records whose role is neither `"user"` nor `"assistant"` are dropped.
    pub fn into_turns(self) -> Vec<Turn> {
        match self {
            Self::Text(text) => vec![Turn::user(text)],
            Self::Texts(texts) => texts.into_iter().map(Turn::user).collect(),
            Self::Records(records) => records
                .into_iter()
                .filter_map(|record| match record.role.as_str() {
                    "user" => Some(Turn::user(record.content)),
                    "assistant" => Some(Turn::agent(record.content)),
                    _ => None,
                })
                .collect(),
            Self::Empty => Vec::new(),
        }
    }
}

impl From<&str> for MessageInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for MessageInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Texts(texts)
    }
}

impl From<Vec<&str>> for MessageInput {
    fn from(texts: Vec<&str>) -> Self {
        Self::Texts(texts.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<MessageRecord>> for MessageInput {
    fn from(records: Vec<MessageRecord>) -> Self {
        Self::Records(records)
    }
}

impl TryFrom<Value> for MessageInput {
    type Error = PhiloError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

/// Normalize any supported input into turns.
pub fn normalize(input: impl Into<MessageInput>) -> Vec<Turn> {
    input.into().into_turns()
}

/// Normalize loosely-typed JSON input into turns.
pub fn normalize_json(value: &Value) -> Result<Vec<Turn>> {
    Ok(MessageInput::from_json(value)?.into_turns())
}

fn record_from_json(index: usize, item: &Value) -> Result<MessageRecord> {
    let Value::Object(map) = item else {
        return Err(PhiloError::Validation(format!(
            "message {index}: expected a record, got {}",
            json_kind(item)
        )));
    };
    let field = |key: &str| -> Result<String> {
        match map.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(PhiloError::Validation(format!(
                "message {index}: `{key}` must be a string, got {}",
                json_kind(other)
            ))),
            None => Err(PhiloError::Validation(format!(
                "message {index}: missing `{key}`"
            ))),
        }
    };
    Ok(MessageRecord {
        role: field("role")?,
        content: field("content")?,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
