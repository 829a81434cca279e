//! Bank recovery
//!
//! Banks are per-player save files a map keeps between games. Their
//! contents are replayed as game events at loop 0 of every replay:
//!
//! ```text
//! game events ─► reconstruct ─► SlotBanks { name ─► BankDocument }
//!                                               │
//!                          BankExporter ◄─ render (XML)
//! ```

pub mod document;
pub mod error;
pub mod export;
pub mod reconstruct;
pub mod value;
pub mod writer;

pub use document::{BankDocument, BankEventKind, BankNode, BankOwner, event_type};
pub use error::BankError;
pub use export::{BankExporter, sanitize_component};
pub use reconstruct::{SlotBanks, reconstruct, reconstruct_session};
pub use value::{BankValue, DEFERRED_TYPE, ValueKind};
pub use writer::{BankProvenance, BankXml, render};
