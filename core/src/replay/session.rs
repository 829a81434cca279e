//! Replay session
//!
//! A [`ReplaySession`] is built once from a replay container: the header is
//! decoded, a protocol is resolved for its base build and every requested
//! section is decoded. The session owns the container until it is closed.

use std::any::Any;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use bitflags::bitflags;
use sc2bank_shared::{AttributesEvents, Details, Event, Header, InitData, Metadata};

use super::archive::{Archive, ArchiveOpener, files};
use super::error::ReplayError;
use super::protocol::{DecodedEvents, Protocol, ProtocolRegistry, Resolution};
use super::summary::ReplaySummary;
use super::tracker::TrackerAnalytics;

bitflags! {
    /// Event streams to decode. Header, details, init data, attributes and
    /// metadata are always decoded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DecodeStreams: u8 {
        const GAME = 1 << 0;
        const MESSAGE = 1 << 1;
        const TRACKER = 1 << 2;
    }
}

impl DecodeStreams {
    pub fn new(game: bool, message: bool, tracker: bool) -> Self {
        let mut streams = Self::empty();
        streams.set(Self::GAME, game);
        streams.set(Self::MESSAGE, message);
        streams.set(Self::TRACKER, tracker);
        streams
    }
}

impl Default for DecodeStreams {
    fn default() -> Self {
        Self::all()
    }
}

/// Closes the archive exactly once, on drop at the latest.
struct ArchiveGuard {
    archive: Box<dyn Archive>,
    closed: bool,
}

impl ArchiveGuard {
    fn new(archive: Box<dyn Archive>) -> Self {
        Self {
            archive,
            closed: false,
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.archive.close() {
            tracing::warn!(%err, "Failed to close replay archive");
        }
    }
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        self.close();
    }
}

/// One decoded event stream
#[derive(Debug, Default)]
struct Stream {
    events: Vec<Event>,
    /// Decoding stopped early
    err: bool,
}

/// Everything decoded from the container
struct Decoded {
    header: Header,
    protocol: Arc<dyn Protocol>,
    details: Details,
    init_data: InitData,
    attributes: AttributesEvents,
    metadata: Option<Metadata>,
    game: Stream,
    message: Stream,
    tracker: Stream,
    analytics: Option<TrackerAnalytics>,
}

/// A decoded replay.
///
/// Immutable once constructed. The underlying archive is released by
/// [`close`](Self::close) or on drop, whichever comes first.
pub struct ReplaySession {
    decoded: Decoded,
    archive: ArchiveGuard,
}

impl ReplaySession {
    /// Open a replay from a seekable byte source.
    pub fn open<R: Read + Seek>(
        mut reader: R,
        opener: &dyn ArchiveOpener,
        registry: &ProtocolRegistry,
        streams: DecodeStreams,
    ) -> Result<Self, ReplayError> {
        let archive = opener.open(&mut reader).map_err(|err| {
            tracing::debug!(%err, "Input is not a replay container");
            ReplayError::InvalidReplayFile
        })?;
        Self::from_archive(archive, registry, streams)
    }

    /// Open the replay file at `path`.
    pub fn open_file(
        path: impl AsRef<Path>,
        opener: &dyn ArchiveOpener,
        registry: &ProtocolRegistry,
        streams: DecodeStreams,
    ) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            tracing::debug!(path = %path.display(), %err, "Failed to open replay file");
            ReplayError::InvalidReplayFile
        })?;
        Self::open(BufReader::new(file), opener, registry, streams)
    }

    /// Decode a replay from an already opened archive.
    ///
    /// The archive is closed before returning on every error path.
    pub fn from_archive(
        archive: Box<dyn Archive>,
        registry: &ProtocolRegistry,
        streams: DecodeStreams,
    ) -> Result<Self, ReplayError> {
        let mut guard = ArchiveGuard::new(archive);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            decode(guard.archive.as_mut(), registry, streams)
        }));

        match result {
            Ok(Ok(decoded)) => Ok(Self {
                decoded,
                archive: guard,
            }),
            Ok(Err(err)) => {
                guard.close();
                Err(err)
            }
            Err(payload) => {
                tracing::warn!(
                    reason = panic_message(&*payload),
                    "Replay decoder panicked"
                );
                guard.close();
                Err(ReplayError::DecodingFailed)
            }
        }
    }

    /// Release the underlying archive. Further calls do nothing.
    pub fn close(&mut self) {
        self.archive.close();
    }

    pub fn header(&self) -> &Header {
        &self.decoded.header
    }

    /// Protocol the replay was decoded with
    pub fn protocol(&self) -> &Arc<dyn Protocol> {
        &self.decoded.protocol
    }

    pub fn details(&self) -> &Details {
        &self.decoded.details
    }

    pub fn init_data(&self) -> &InitData {
        &self.decoded.init_data
    }

    pub fn attributes(&self) -> &AttributesEvents {
        &self.decoded.attributes
    }

    /// Game metadata; replays older than 3.7 have none
    pub fn metadata(&self) -> Option<&Metadata> {
        self.decoded.metadata.as_ref()
    }

    pub fn game_events(&self) -> &[Event] {
        &self.decoded.game.events
    }

    pub fn message_events(&self) -> &[Event] {
        &self.decoded.message.events
    }

    pub fn tracker_events(&self) -> &[Event] {
        &self.decoded.tracker.events
    }

    /// Decoding game events stopped early
    pub fn game_events_err(&self) -> bool {
        self.decoded.game.err
    }

    pub fn message_events_err(&self) -> bool {
        self.decoded.message.err
    }

    pub fn tracker_events_err(&self) -> bool {
        self.decoded.tracker.err
    }

    /// Tracker analytics, computed when tracker events were decoded
    pub fn tracker_analytics(&self) -> Option<&TrackerAnalytics> {
        self.decoded.analytics.as_ref()
    }

    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary::from_session(self)
    }
}

impl std::fmt::Debug for ReplaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaySession")
            .field("version", &self.decoded.header.version_string())
            .field("base_build", &self.decoded.protocol.base_build())
            .field("title", &self.decoded.details.title)
            .field("closed", &self.archive.closed)
            .finish_non_exhaustive()
    }
}

fn decode(
    archive: &mut dyn Archive,
    registry: &ProtocolRegistry,
    streams: DecodeStreams,
) -> Result<Decoded, ReplayError> {
    let header = registry.decode_header(archive.user_data()).map_err(|err| {
        tracing::debug!(%err, "Failed to decode replay header");
        ReplayError::InvalidReplayFile
    })?;

    let base_build = header.base_build;
    let (protocol, resolution) = registry
        .resolve(base_build)
        .ok_or(ReplayError::UnsupportedReplayVersion { base_build })?;
    if let Resolution::Fallback { requested } = resolution {
        tracing::warn!(
            requested,
            using = protocol.base_build(),
            "No protocol for base build, falling back to the newest"
        );
    }

    let data = read_with_backup(archive, files::DETAILS, files::DETAILS_BACKUP)?;
    let details = protocol
        .decode_details(&data)
        .map_err(|err| decoding_failed(files::DETAILS, err))?;

    let data = read_with_backup(archive, files::INIT_DATA, files::INIT_DATA_BACKUP)?;
    let init_data = protocol
        .decode_init_data(&data)
        .map_err(|err| decoding_failed(files::INIT_DATA, err))?;

    let data = read_required(archive, files::ATTRIBUTES_EVENTS)?;
    let attributes = protocol
        .decode_attributes_events(&data)
        .map_err(|err| decoding_failed(files::ATTRIBUTES_EVENTS, err))?;

    let metadata = match read(archive, files::GAME_METADATA)? {
        Some(data) => Some(Metadata::from_json(&data).map_err(|err| {
            tracing::debug!(%err, "Game metadata is not valid JSON");
            ReplayError::InvalidReplayFile
        })?),
        None => None,
    };

    let game = if streams.contains(DecodeStreams::GAME) {
        decode_stream(archive, files::GAME_EVENTS, |d| protocol.decode_game_events(d))?
    } else {
        Stream::default()
    };
    let message = if streams.contains(DecodeStreams::MESSAGE) {
        decode_stream(archive, files::MESSAGE_EVENTS, |d| {
            protocol.decode_message_events(d)
        })?
    } else {
        Stream::default()
    };
    let (tracker, analytics) = if streams.contains(DecodeStreams::TRACKER) {
        let tracker = decode_stream(archive, files::TRACKER_EVENTS, |d| {
            protocol.decode_tracker_events(d)
        })?;
        let analytics = TrackerAnalytics::analyze(&tracker.events, &init_data);
        (tracker, Some(analytics))
    } else {
        (Stream::default(), None)
    };

    tracing::debug!(
        version = %header.version_string(),
        base_build,
        game_events = game.events.len(),
        message_events = message.events.len(),
        tracker_events = tracker.events.len(),
        "Replay decoded"
    );

    Ok(Decoded {
        header,
        protocol,
        details,
        init_data,
        attributes,
        metadata,
        game,
        message,
        tracker,
        analytics,
    })
}

fn read(archive: &mut dyn Archive, name: &str) -> Result<Option<Vec<u8>>, ReplayError> {
    archive.read_file(name).map_err(|err| {
        tracing::debug!(file = name, %err, "Failed to read replay section");
        ReplayError::InvalidReplayFile
    })
}

fn read_required(archive: &mut dyn Archive, name: &str) -> Result<Vec<u8>, ReplayError> {
    read(archive, name)?.ok_or_else(|| {
        tracing::debug!(file = name, "Replay section missing");
        ReplayError::InvalidReplayFile
    })
}

/// Primary section, or its anonymized backup when the primary is absent or empty
fn read_with_backup(
    archive: &mut dyn Archive,
    primary: &str,
    backup: &str,
) -> Result<Vec<u8>, ReplayError> {
    if let Some(data) = read(archive, primary)?.filter(|d| !d.is_empty()) {
        return Ok(data);
    }
    tracing::debug!(file = primary, backup, "Trying backup section");
    read(archive, backup)?
        .filter(|d| !d.is_empty())
        .ok_or(ReplayError::InvalidReplayFile)
}

fn decode_stream(
    archive: &mut dyn Archive,
    name: &str,
    decode: impl FnOnce(&[u8]) -> DecodedEvents,
) -> Result<Stream, ReplayError> {
    let data = read_required(archive, name)?;
    let DecodedEvents { events, error } = decode(&data);
    if let Some(err) = &error {
        tracing::debug!(
            file = name,
            %err,
            decoded = events.len(),
            "Event stream decoded partially"
        );
    }
    Ok(Stream {
        events,
        err: error.is_some(),
    })
}

fn decoding_failed(section: &str, err: impl std::fmt::Display) -> ReplayError {
    tracing::debug!(section, %err, "Failed to decode replay section");
    ReplayError::DecodingFailed
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
