//! Replay decoding
//!
//! A replay is an MPQ container holding a header, lobby data, player
//! details and three event streams:
//!
//! ```text
//! bytes ─► ArchiveOpener ─► Archive ─► ReplaySession
//!                                        ├─ header / details / init data
//!                                        ├─ game, message, tracker events
//!                                        └─ TrackerAnalytics
//! ```
//!
//! Reading the container and decoding the versioned wire protocol is done by
//! implementations of [`ArchiveOpener`] and [`Protocol`]. The session picks a
//! protocol for the replay's base build, handles the anonymized backup
//! sections and contains decoder faults.
//!
//! # Usage
//!
//! ```ignore
//! use sc2bank_core::replay::{DecodeStreams, ProtocolRegistry, ReplaySession};
//!
//! let registry = ProtocolRegistry::new(header_decoder).with(protocol_88500);
//! let session =
//!     ReplaySession::open_file("game.SC2Replay", &opener, &registry, DecodeStreams::all())?;
//! println!("{}", session.summary());
//! ```

pub mod archive;
pub mod error;
pub mod mpq;
pub mod protocol;
pub mod session;
pub mod summary;
pub mod tracker;

pub use archive::{Archive, ArchiveError, ArchiveOpener, ReadSeek, files};
pub use error::ReplayError;
pub use mpq::UserDataHeader;
pub use protocol::{
    DecodeError, DecodedEvents, HeaderDecoder, Protocol, ProtocolRegistry, Resolution,
};
pub use session::{DecodeStreams, ReplaySession};
pub use summary::{ReplaySummary, SummaryPlayer};
pub use tracker::{
    PlayerDescriptor, StartLocation, TrackerAnalytics, angle_to_clock, calc_sq,
};
