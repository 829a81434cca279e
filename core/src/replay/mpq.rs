//! MPQ user-data header
//!
//! Replays prefix the archive with a user-data block that carries the
//! encoded replay header. Parsing it is the cheap check archive openers use
//! to reject input that is not a replay container before doing real work.
//!
//! # Layout
//!
//! ```text
//! 0x00  magic            "MPQ\x1B"
//! 0x04  user_data_size   u32 LE  (reserved space for user data)
//! 0x08  header_offset    u32 LE  (offset of the archive header)
//! 0x0C  content_size     u32 LE  (bytes of user data that follow)
//! 0x10  content          [u8; content_size]
//! ....
//! header_offset: "MPQ\x1A" archive header
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use super::archive::ArchiveError;

pub const USER_DATA_MAGIC: [u8; 4] = *b"MPQ\x1B";
pub const ARCHIVE_MAGIC: [u8; 4] = *b"MPQ\x1A";

/// Fixed part of the user-data header
pub const USER_DATA_HEADER_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataHeader {
    pub user_data_size: u32,
    /// Offset of the archive header from the start of the file
    pub header_offset: u32,
    /// The user-data content (the encoded replay header)
    pub content: Vec<u8>,
}

impl UserDataHeader {
    /// Parse the user-data header at the start of `data` and verify an
    /// archive header follows at the advertised offset.
    pub fn parse(data: &[u8]) -> Result<Self, ArchiveError> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 4];
        cursor
            .read_exact(&mut magic)
            .map_err(|_| ArchiveError::NotAnArchive)?;
        if magic != USER_DATA_MAGIC {
            return Err(ArchiveError::NotAnArchive);
        }

        let user_data_size = read_u32(&mut cursor)?;
        let header_offset = read_u32(&mut cursor)?;
        let content_size = read_u32(&mut cursor)? as usize;

        let content_end = USER_DATA_HEADER_SIZE
            .checked_add(content_size)
            .filter(|end| *end <= data.len())
            .ok_or_else(|| ArchiveError::Corrupt("user data exceeds input".to_string()))?;
        let content = data[USER_DATA_HEADER_SIZE..content_end].to_vec();

        let offset = header_offset as usize;
        let archive_magic = offset
            .checked_add(ARCHIVE_MAGIC.len())
            .and_then(|end| data.get(offset..end))
            .ok_or(ArchiveError::NotAnArchive)?;
        if archive_magic != ARCHIVE_MAGIC {
            return Err(ArchiveError::NotAnArchive);
        }

        Ok(Self {
            user_data_size,
            header_offset,
            content,
        })
    }
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, ArchiveError> {
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| ArchiveError::NotAnArchive)
}
