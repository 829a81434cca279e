//! Generic decoded event model
//!
//! Protocol decoders hand every event stream over as a flat list of
//! [`Event`]s. Field values keep the shape of the wire protocol (integers,
//! blobs, nested structs, arrays) so consumers read them through the typed
//! accessors instead of matching on [`Value`] directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Optional field that was not present on the wire
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Raw bytes; strings are transported as blobs
    Blob(Vec<u8>),
    Array(Vec<Value>),
    Struct(Struct),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Blob interpreted as (lossy) UTF-8.
    pub fn as_string(&self) -> Option<String> {
        self.as_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Blob(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::Struct(s)
    }
}

/// Named fields of a decoded structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Struct {
    fields: BTreeMap<String, Value>,
}

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(Value::as_int)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.value(name).and_then(Value::as_string)
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.value(name).and_then(Value::as_bytes)
    }

    pub fn array(&self, name: &str) -> Option<&[Value]> {
        self.value(name).and_then(Value::as_array)
    }

    pub fn structv(&self, name: &str) -> Option<&Struct> {
        self.value(name).and_then(Value::as_struct)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One decoded event of a game, message or tracker stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Protocol event id (tracker events are identified by this)
    pub id: u32,
    /// Protocol event type name (game events are identified by this)
    pub name: String,
    /// Logical tick the event happened at
    pub game_loop: u64,
    /// Originating user; tracker events carry none
    pub user_id: Option<i64>,
    pub fields: Struct,
}

impl Event {
    pub fn new(id: u32, name: impl Into<String>, game_loop: u64) -> Self {
        Self {
            id,
            name: name.into(),
            game_loop,
            user_id: None,
            fields: Struct::new(),
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value);
        self
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.value(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.fields.int(name)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.fields.string(name)
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.fields.bytes(name)
    }

    pub fn array(&self, name: &str) -> Option<&[Value]> {
        self.fields.array(name)
    }

    pub fn structv(&self, name: &str) -> Option<&Struct> {
        self.fields.structv(name)
    }
}
