//! Replay container access
//!
//! The container (an MPQ archive) is read by an external implementation
//! behind the [`Archive`] trait. A session only needs the user-data block,
//! which holds the encoded header, and named file lookup.

use std::io::{self, Read, Seek};

/// Names of the replay sections inside the container
pub mod files {
    pub const DETAILS: &str = "replay.details";
    /// Anonymized copy written when the primary is stripped
    pub const DETAILS_BACKUP: &str = "replay.details.backup";
    pub const INIT_DATA: &str = "replay.initData";
    pub const INIT_DATA_BACKUP: &str = "replay.initData.backup";
    pub const ATTRIBUTES_EVENTS: &str = "replay.attributes.events";
    pub const GAME_METADATA: &str = "replay.gamemetadata.json";
    pub const GAME_EVENTS: &str = "replay.game.events";
    pub const MESSAGE_EVENTS: &str = "replay.message.events";
    pub const TRACKER_EVENTS: &str = "replay.tracker.events";
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Input is not a replay container at all
    #[error("input is not an MPQ archive")]
    NotAnArchive,

    #[error("archive I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt archive: {0}")]
    Corrupt(String),
}

/// An open replay container.
pub trait Archive {
    /// The user-data block preceding the archive
    fn user_data(&self) -> &[u8];

    /// Contents of the named file, `Ok(None)` if the archive has no such file.
    fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError>;

    /// Release the underlying resource.
    ///
    /// Sessions call this exactly once; implementations may still treat a
    /// second call as a no-op.
    fn close(&mut self) -> Result<(), ArchiveError>;
}

/// Opens containers from seekable byte sources.
pub trait ArchiveOpener {
    fn open(&self, input: &mut dyn ReadSeek) -> Result<Box<dyn Archive>, ArchiveError>;
}

/// Object-safe `Read + Seek`
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}
