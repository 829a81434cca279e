//! Bank documents
//!
//! A bank is stored in a replay as a flat run of game events: one
//! `BankFile` event followed by its sections, keys, values and signature.
//! [`BankDocument`] keeps those as an ordered node list; the tree is only
//! built when the document is written.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use sc2bank_shared::{Event, Player, Value};
use serde::Serialize;

use super::error::BankError;
use super::value::BankValue;
use super::writer::{BankProvenance, render};

/// Game event type names of the bank events
pub mod event_type {
    pub const BANK_FILE: &str = "BankFile";
    pub const BANK_SECTION: &str = "BankSection";
    pub const BANK_KEY: &str = "BankKey";
    pub const BANK_VALUE: &str = "BankValue";
    pub const BANK_SIGNATURE: &str = "BankSignature";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankEventKind {
    File,
    Section,
    Key,
    Value,
    Signature,
}

impl BankEventKind {
    /// Kind of the game event type `name`, `None` for non-bank events
    pub fn classify(name: &str) -> Option<Self> {
        match name {
            event_type::BANK_FILE => Some(Self::File),
            event_type::BANK_SECTION => Some(Self::Section),
            event_type::BANK_KEY => Some(Self::Key),
            event_type::BANK_VALUE => Some(Self::Value),
            event_type::BANK_SIGNATURE => Some(Self::Signature),
            _ => None,
        }
    }
}

/// One content event of a bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BankNode {
    Section {
        name: String,
    },
    Key {
        name: String,
        /// Keys may carry their value inline
        value: Option<BankValue>,
    },
    Value {
        name: String,
        value: BankValue,
    },
    Signature(Vec<u8>),
}

impl BankNode {
    /// Convert a section, key, value or signature event.
    pub fn from_event(evt: &Event) -> Result<Self, BankError> {
        let name = || evt.string("name").unwrap_or_default();
        match BankEventKind::classify(&evt.name) {
            Some(BankEventKind::Section) => Ok(BankNode::Section { name: name() }),
            Some(BankEventKind::Key) => {
                let value = match evt.value("type").and_then(Value::as_int) {
                    Some(code) => Some(BankValue::from_code(code, data(evt))?),
                    None => None,
                };
                Ok(BankNode::Key {
                    name: name(),
                    value,
                })
            }
            Some(BankEventKind::Value) => {
                let code = evt.int("type").unwrap_or_default();
                Ok(BankNode::Value {
                    name: name(),
                    value: BankValue::from_code(code, data(evt))?,
                })
            }
            Some(BankEventKind::Signature) => Ok(BankNode::Signature(signature(evt))),
            Some(BankEventKind::File) | None => Err(BankError::InvalidBankEvent {
                name: evt.name.clone(),
            }),
        }
    }
}

fn data(evt: &Event) -> String {
    evt.string("data").unwrap_or_default()
}

/// Signature bytes, given either as an array of byte values or a blob
fn signature(evt: &Event) -> Vec<u8> {
    if let Some(values) = evt.array("signature") {
        return values
            .iter()
            .filter_map(Value::as_int)
            .filter_map(|b| u8::try_from(b).ok())
            .collect();
    }
    evt.bytes("signature").map(<[u8]>::to_vec).unwrap_or_default()
}

/// Lobby identity of a bank's owner
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BankOwner {
    pub slot_index: usize,
    pub user_id: Option<i64>,
    pub toon_handle: String,
    /// Details player with the same toon, absent for unmatched slots
    pub player: Option<Player>,
}

/// A bank reconstructed from replay events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankDocument {
    name: String,
    owner: BankOwner,
    nodes: Vec<BankNode>,
}

impl BankDocument {
    /// Start a document from its `BankFile` event.
    pub fn from_file_event(evt: &Event, owner: BankOwner) -> Result<Self, BankError> {
        if BankEventKind::classify(&evt.name) != Some(BankEventKind::File) {
            return Err(BankError::InvalidBankEvent {
                name: evt.name.clone(),
            });
        }
        Ok(Self {
            name: evt.string("name").unwrap_or_default(),
            owner,
            nodes: Vec::new(),
        })
    }

    /// Append a content event. `BankFile` and non-bank events are rejected.
    pub fn add_event(&mut self, evt: &Event) -> Result<(), BankError> {
        let node = BankNode::from_event(evt)?;
        self.nodes.push(node);
        Ok(())
    }

    /// Bank file name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &BankOwner {
        &self.owner
    }

    pub fn nodes(&self) -> &[BankNode] {
        &self.nodes
    }

    /// Write the bank as XML, returning the number of bytes written.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        provenance: &BankProvenance,
        indent: usize,
    ) -> io::Result<u64> {
        render(self, provenance).write_to(writer, indent)
    }

    /// Write the bank to `path`, creating parent directories.
    pub fn save_as_file(
        &self,
        path: &Path,
        provenance: &BankProvenance,
        indent: usize,
    ) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, provenance, indent)?;
        writer.flush()
    }
}
