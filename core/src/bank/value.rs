//! Bank value kinds

use serde::Serialize;

use super::error::BankError;

/// Type code of a value whose payload arrives with the next value event
pub const DEFERRED_TYPE: i64 = 7;

/// Kind of a bank value, identified by its wire type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Fixed,
    Flag,
    Int,
    String,
    Point,
    Unit,
    Text,
}

impl ValueKind {
    pub const ALL: [ValueKind; 7] = [
        ValueKind::Fixed,
        ValueKind::Flag,
        ValueKind::Int,
        ValueKind::String,
        ValueKind::Point,
        ValueKind::Unit,
        ValueKind::Text,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }

    pub fn code(self) -> i64 {
        match self {
            ValueKind::Fixed => 0,
            ValueKind::Flag => 1,
            ValueKind::Int => 2,
            ValueKind::String => 3,
            ValueKind::Point => 4,
            ValueKind::Unit => 5,
            ValueKind::Text => 6,
        }
    }

    /// Attribute name the value is written under
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Fixed => "fixed",
            ValueKind::Flag => "flag",
            ValueKind::Int => "int",
            ValueKind::String => "string",
            ValueKind::Point => "point",
            ValueKind::Unit => "unit",
            ValueKind::Text => "text",
        }
    }
}

/// Payload of a key or value event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BankValue {
    Inline { kind: ValueKind, data: String },
    /// Resolved from the value node that follows it
    Deferred,
}

impl BankValue {
    pub fn from_code(code: i64, data: String) -> Result<Self, BankError> {
        if code == DEFERRED_TYPE {
            return Ok(BankValue::Deferred);
        }
        ValueKind::from_code(code)
            .map(|kind| BankValue::Inline { kind, data })
            .ok_or(BankError::UnknownValueType(code))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, BankValue::Deferred)
    }
}
