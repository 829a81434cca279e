//! Shared record types for SC2 bank recovery.
//!
//! These are the decoded shapes an archive reader and protocol decoder hand
//! over: the header, game details, init data, attribute events, metadata and
//! the generic [`Event`] used by every event stream.

pub mod attributes;
pub mod details;
pub mod event;
pub mod header;
pub mod init_data;
pub mod metadata;

pub use attributes::{Attribute, AttributesEvents};
pub use details::{Details, GameResult, GameSpeed, Player, Toon};
pub use event::{Event, Struct, Value};
pub use header::{Header, LOOPS_PER_SECOND, Version, format_duration};
pub use init_data::{GameDescription, InitData, LobbyState, Slot};
pub use metadata::{Metadata, MetadataPlayer};
