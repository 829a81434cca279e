//! Shared test utilities for integration and unit tests

use std::cell::Cell;
use std::collections::HashMap;
use std::io::Read;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sc2bank_shared::{
    AttributesEvents, Details, Event, GameDescription, GameResult, Header, InitData, LobbyState,
    Metadata, MetadataPlayer, Player, Slot, Struct, Toon, Value, Version,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bank::BankProvenance;
use crate::replay::archive::{Archive, ArchiveError, ArchiveOpener, ReadSeek, files};
use crate::replay::mpq::{ARCHIVE_MAGIC, USER_DATA_HEADER_SIZE, USER_DATA_MAGIC, UserDataHeader};
use crate::replay::protocol::{
    DecodeError, DecodedEvents, HeaderDecoder, Protocol, ProtocolRegistry,
};
use crate::replay::tracker::event_id;
use crate::replay::{DecodeStreams, ReplaySession};

pub const TEST_BASE_BUILD: u32 = 88500;

// ============================================================================
// Fake Decoders
// ============================================================================

fn decode_json<T: DeserializeOwned>(data: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(data).map_err(|e| DecodeError::new(e.to_string()))
}

fn encode_json<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

/// Header decoder reading JSON encoded headers
#[derive(Debug, Default)]
pub struct FakeHeaderDecoder;

impl HeaderDecoder for FakeHeaderDecoder {
    fn decode_header(&self, user_data: &[u8]) -> Result<Header, DecodeError> {
        decode_json(user_data)
    }
}

/// Protocol decoding JSON encoded sections
#[derive(Debug)]
pub struct FakeProtocol {
    base_build: u32,
    panics: bool,
    rejects_details: bool,
    broken_streams: DecodeStreams,
}

impl FakeProtocol {
    pub fn new(base_build: u32) -> Self {
        Self {
            base_build,
            panics: false,
            rejects_details: false,
            broken_streams: DecodeStreams::empty(),
        }
    }

    /// Panic while decoding details, like a decoder indexing past its input
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn rejecting_details(mut self) -> Self {
        self.rejects_details = true;
        self
    }

    /// Report a decode error after the events of `streams`
    pub fn with_broken_streams(mut self, streams: DecodeStreams) -> Self {
        self.broken_streams = streams;
        self
    }

    fn decode_events(&self, data: &[u8], stream: DecodeStreams) -> DecodedEvents {
        match decode_json::<Vec<Event>>(data) {
            Ok(events) if self.broken_streams.contains(stream) => {
                DecodedEvents::partial(events, DecodeError::new("unexpected end of stream"))
            }
            Ok(events) => DecodedEvents::complete(events),
            Err(err) => DecodedEvents::partial(Vec::new(), err),
        }
    }
}

impl Protocol for FakeProtocol {
    fn base_build(&self) -> u32 {
        self.base_build
    }

    fn decode_details(&self, data: &[u8]) -> Result<Details, DecodeError> {
        if self.panics {
            panic!("details decoder read past {} bytes of input", data.len());
        }
        if self.rejects_details {
            return Err(DecodeError::new("bad details"));
        }
        decode_json(data)
    }

    fn decode_init_data(&self, data: &[u8]) -> Result<InitData, DecodeError> {
        decode_json(data)
    }

    fn decode_attributes_events(&self, data: &[u8]) -> Result<AttributesEvents, DecodeError> {
        decode_json(data)
    }

    fn decode_game_events(&self, data: &[u8]) -> DecodedEvents {
        self.decode_events(data, DecodeStreams::GAME)
    }

    fn decode_message_events(&self, data: &[u8]) -> DecodedEvents {
        self.decode_events(data, DecodeStreams::MESSAGE)
    }

    fn decode_tracker_events(&self, data: &[u8]) -> DecodedEvents {
        self.decode_events(data, DecodeStreams::TRACKER)
    }
}

pub fn test_registry() -> ProtocolRegistry {
    ProtocolRegistry::new(FakeHeaderDecoder).with(Arc::new(FakeProtocol::new(TEST_BASE_BUILD)))
}

// ============================================================================
// Fake Archive
// ============================================================================

/// In-memory archive counting how often it is closed
#[derive(Debug, Clone, Default)]
pub struct FakeArchive {
    user_data: Vec<u8>,
    files: HashMap<String, Vec<u8>>,
    closes: Rc<Cell<usize>>,
    failing_reads: bool,
}

impl FakeArchive {
    pub fn new(header: &Header) -> Self {
        Self {
            user_data: encode_json(header),
            ..Default::default()
        }
    }

    pub fn with_user_data(mut self, user_data: Vec<u8>) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), data);
        self
    }

    pub fn with_json<T: Serialize>(self, name: &str, value: &T) -> Self {
        self.with_file(name, encode_json(value))
    }

    pub fn without_file(mut self, name: &str) -> Self {
        self.files.remove(name);
        self
    }

    /// Every read fails with an I/O style error
    pub fn failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.get(name).cloned()
    }

    /// Shared counter of `close` calls, also shared by clones
    pub fn close_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closes)
    }
}

impl Archive for FakeArchive {
    fn user_data(&self) -> &[u8] {
        &self.user_data
    }

    fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        if self.failing_reads {
            return Err(ArchiveError::Corrupt(format!("bad block in {name}")));
        }
        Ok(self.files.get(name).cloned())
    }

    fn close(&mut self) -> Result<(), ArchiveError> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

/// Opener that sniffs the MPQ user-data header, then hands out a copy of
/// its template archive carrying the sniffed user data.
pub struct FakeOpener {
    template: FakeArchive,
}

impl FakeOpener {
    /// Opener for `archive` and the container bytes it accepts
    pub fn wrap(archive: FakeArchive) -> (Self, Vec<u8>) {
        let bytes = mpq_container(&archive.user_data);
        (Self { template: archive }, bytes)
    }
}

impl ArchiveOpener for FakeOpener {
    fn open(&self, input: &mut dyn ReadSeek) -> Result<Box<dyn Archive>, ArchiveError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        let header = UserDataHeader::parse(&bytes)?;
        Ok(Box::new(self.template.clone().with_user_data(header.content)))
    }
}

/// MPQ user-data block holding `content`, followed by an archive header
pub fn mpq_container(content: &[u8]) -> Vec<u8> {
    let header_offset = (USER_DATA_HEADER_SIZE + content.len()) as u32;
    let mut data = Vec::new();
    data.extend_from_slice(&USER_DATA_MAGIC);
    data.extend_from_slice(&512u32.to_le_bytes());
    data.extend_from_slice(&header_offset.to_le_bytes());
    data.extend_from_slice(&(content.len() as u32).to_le_bytes());
    data.extend_from_slice(content);
    data.extend_from_slice(&ARCHIVE_MAGIC);
    data.extend_from_slice(&[0u8; 28]);
    data
}

// ============================================================================
// Replay Fixture
// ============================================================================

pub fn test_header() -> Header {
    Header {
        version: Version {
            major: 5,
            minor: 0,
            revision: 11,
            build: TEST_BASE_BUILD,
        },
        base_build: TEST_BASE_BUILD,
        loops: 16 * 754,
        signature: None,
    }
}

fn toon(id: i64) -> Toon {
    Toon {
        region: 2,
        program_id: "S2".to_string(),
        realm: 1,
        id,
    }
}

/// Alice (2-S2-1-100) and Bob (2-S2-1-200)
pub fn test_details() -> Details {
    Details {
        title: "Bank Test Map".to_string(),
        players: vec![
            Player {
                name: "Alice".to_string(),
                race: "Protoss".to_string(),
                team_id: 0,
                result: GameResult::Victory,
                toon: toon(100),
            },
            Player {
                name: "Bob".to_string(),
                race: "Zerg".to_string(),
                team_id: 1,
                result: GameResult::Defeat,
                toon: toon(200),
            },
        ],
        ..Default::default()
    }
}

/// Map `x` by `y`, one slot per handle with user ids 0, 1, ...
pub fn init_data_with_slots(map_size_x: i64, map_size_y: i64, handles: &[&str]) -> InitData {
    InitData {
        game_description: GameDescription {
            map_size_x,
            map_size_y,
            max_players: handles.len() as i64,
            max_observers: 0,
        },
        lobby: LobbyState {
            slots: handles
                .iter()
                .enumerate()
                .map(|(i, handle)| Slot {
                    user_id: Some(i as i64),
                    toon_handle: handle.to_string(),
                    control: 2,
                    team_id: i as i64,
                    observe: 0,
                })
                .collect(),
        },
    }
}

/// Alice and Bob plus an anonymous slot, on a 50x50 map
pub fn test_init_data() -> InitData {
    init_data_with_slots(50, 50, &["2-S2-1-100", "2-S2-1-200", ""])
}

pub fn test_game_events() -> Vec<Event> {
    let camera = Event::new(49, "CameraUpdate", 16).with_user(0);
    vec![
        bank_file(0, "RPGSave"),
        bank_file(1, "RPGSave"),
        bank_section(0, "Hero"),
        bank_section(1, "Hero"),
        bank_key(0, "level"),
        bank_value(0, "level", 2, "12"),
        bank_key(1, "level"),
        bank_value(1, "level", 2, "3"),
        bank_key_with_value(0, "name", 3, "Alice"),
        bank_key(0, "gold"),
        bank_deferred(0, "gold"),
        bank_value(0, "gold", 0, "1500.5"),
        bank_signature(0, &[0x12, 0xAB, 0x00, 0xFF]),
        camera,
        // Past the setup phase
        bank_section(0, "Late"),
    ]
}

pub fn test_tracker_events() -> Vec<Event> {
    vec![
        player_setup(1, 0, 0),
        player_setup(2, 1, 1),
        unit_born(0, 1, "Nexus", 40, 30),
        unit_born(0, 2, "Hatchery", 10, 20),
        unit_born(0, 2, "Drone", 12, 20),
        player_stats(160, 1, (60, 40), (700, 300), (12, 15)),
        player_stats(160, 2, (500, 300), (400, 0), (14, 14)),
        player_stats(320, 1, (60, 40), (700, 300), (15, 15)),
        player_stats(320, 2, (500, 300), (400, 0), (20, 22)),
    ]
}

/// Complete replay archive for [`test_header`]
pub fn replay_archive() -> FakeArchive {
    let metadata = Metadata {
        title: "Bank Test Map".to_string(),
        game_version: "5.0.11.88500".to_string(),
        base_build: format!("Base{TEST_BASE_BUILD}"),
        duration: 754.0,
        players: vec![
            MetadataPlayer {
                player_id: 1,
                apm: 120.0,
                result: "Win".to_string(),
                ..Default::default()
            },
            MetadataPlayer {
                player_id: 2,
                apm: 80.0,
                result: "Loss".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    FakeArchive::new(&test_header())
        .with_json(files::DETAILS, &test_details())
        .with_json(files::INIT_DATA, &test_init_data())
        .with_json(files::ATTRIBUTES_EVENTS, &AttributesEvents::default())
        .with_json(files::GAME_METADATA, &metadata)
        .with_json(files::GAME_EVENTS, &test_game_events())
        .with_json(files::MESSAGE_EVENTS, &Vec::<Event>::new())
        .with_json(files::TRACKER_EVENTS, &test_tracker_events())
}

pub fn test_session(streams: DecodeStreams) -> ReplaySession {
    ReplaySession::from_archive(Box::new(replay_archive()), &test_registry(), streams).unwrap()
}

pub fn recovered_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 12, 30, 0).unwrap()
}

pub fn provenance() -> BankProvenance {
    let header = test_header();
    BankProvenance {
        recovered_at: recovered_at(),
        title: "Bank Test Map".to_string(),
        version: header.version_string(),
        loops: header.loops,
        duration: header.duration(),
    }
}

// ============================================================================
// Tracker Event Builders
// ============================================================================

pub fn player_setup(player_id: i64, slot_id: i64, user_id: i64) -> Event {
    Event::new(event_id::PLAYER_SETUP, "PlayerSetup", 0)
        .with_field("playerId", player_id)
        .with_field("slotId", slot_id)
        .with_field("userId", user_id)
}

pub fn unit_born(game_loop: u64, player_id: i64, unit: &str, x: i64, y: i64) -> Event {
    Event::new(event_id::UNIT_BORN, "UnitBorn", game_loop)
        .with_field("unitTypeName", unit)
        .with_field("controlPlayerId", player_id)
        .with_field("x", x)
        .with_field("y", y)
}

/// Stats sample with (minerals, vespene) current, (minerals, vespene)
/// collection rate and (food used, food made)
pub fn player_stats(
    game_loop: u64,
    player_id: i64,
    current: (i64, i64),
    rate: (i64, i64),
    food: (i64, i64),
) -> Event {
    let stats = Struct::new()
        .with("scoreValueMineralsCurrent", current.0)
        .with("scoreValueVespeneCurrent", current.1)
        .with("scoreValueMineralsCollectionRate", rate.0)
        .with("scoreValueVespeneCollectionRate", rate.1)
        .with("scoreValueFoodUsed", food.0)
        .with("scoreValueFoodMade", food.1);
    Event::new(event_id::PLAYER_STATS, "PlayerStats", game_loop)
        .with_field("playerId", player_id)
        .with_field("stats", stats)
}

// ============================================================================
// Bank Event Builders
// ============================================================================

fn bank_event(user_id: i64, name: &str) -> Event {
    Event::new(0, name, 0).with_user(user_id)
}

pub fn bank_file(user_id: i64, name: &str) -> Event {
    bank_event(user_id, "BankFile").with_field("name", name)
}

pub fn bank_section(user_id: i64, name: &str) -> Event {
    bank_event(user_id, "BankSection").with_field("name", name)
}

pub fn bank_key(user_id: i64, name: &str) -> Event {
    bank_event(user_id, "BankKey").with_field("name", name)
}

pub fn bank_key_with_value(user_id: i64, name: &str, type_code: i64, data: &str) -> Event {
    bank_key(user_id, name)
        .with_field("type", type_code)
        .with_field("data", data)
}

pub fn bank_value(user_id: i64, name: &str, type_code: i64, data: &str) -> Event {
    bank_event(user_id, "BankValue")
        .with_field("name", name)
        .with_field("type", type_code)
        .with_field("data", data)
}

/// Value whose payload comes with the next value event
pub fn bank_deferred(user_id: i64, name: &str) -> Event {
    bank_value(user_id, name, 7, "")
}

pub fn bank_signature(user_id: i64, bytes: &[u8]) -> Event {
    let values = bytes.iter().map(|b| Value::Int(i64::from(*b))).collect();
    bank_event(user_id, "BankSignature").with_field("signature", Value::Array(values))
}
