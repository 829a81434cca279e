//! SC2 bank recovery
//!
//! Recovers the bank files (per-player map save data) embedded in StarCraft II
//! replays, plus a few per-player analytics from the tracker events.
//!
//! # Architecture
//!
//! - [`ReplaySession`] - Decoded replay, built through the [`Archive`] and [`Protocol`] seams
//! - [`TrackerAnalytics`] - Start location, orientation and spending quotient per player
//! - [`reconstruct`] - Rebuilds every slot's banks from the game events
//! - [`BankExporter`] - Writes the banks as SC2Bank XML files

pub mod bank;
pub mod config;
#[cfg(test)]
mod integration;
pub mod replay;
#[cfg(test)]
pub mod test_utils;

// Re-export replay types
pub use replay::{
    Archive, ArchiveError, ArchiveOpener, DecodeError, DecodeStreams, DecodedEvents,
    HeaderDecoder, PlayerDescriptor, Protocol, ProtocolRegistry, ReplayError, ReplaySession,
    ReplaySummary, TrackerAnalytics,
};

// Re-export bank types
pub use bank::{
    BankDocument, BankError, BankExporter, BankProvenance, SlotBanks, reconstruct,
    reconstruct_session,
};

pub use config::{Config, ConfigError, DecodeConfig, OutputConfig};

// Record types handed over by decoders
pub use sc2bank_shared as shared;
