//! Attribute events (lobby attribute values per scope)
//!
//! Passed through uninterpreted; bank recovery only needs them present.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttributesEvents {
    pub source: i64,
    pub map_namespace: i64,
    /// scope -> attribute id -> attribute
    pub scopes: BTreeMap<u32, BTreeMap<u32, Attribute>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attribute {
    pub namespace: i64,
    pub id: u32,
    pub scope: u32,
    pub value: String,
}

impl AttributesEvents {
    pub fn get(&self, scope: u32, id: u32) -> Option<&Attribute> {
        self.scopes.get(&scope).and_then(|attrs| attrs.get(&id))
    }
}
