//! Versioned protocol decoding
//!
//! Every game build can change the wire protocol of the replay sections, so
//! decoders are registered per base build. The header itself is encoded the
//! same way in every build and is decoded before a protocol is chosen.

use sc2bank_shared::{AttributesEvents, Details, Event, Header, InitData};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Failure reported by a decoder
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Events decoded from one stream.
///
/// Decoding stops at the first malformed event; everything before it is
/// still returned alongside the error.
#[derive(Debug, Clone, Default)]
pub struct DecodedEvents {
    pub events: Vec<Event>,
    pub error: Option<DecodeError>,
}

impl DecodedEvents {
    pub fn complete(events: Vec<Event>) -> Self {
        Self {
            events,
            error: None,
        }
    }

    pub fn partial(events: Vec<Event>, error: DecodeError) -> Self {
        Self {
            events,
            error: Some(error),
        }
    }
}

/// Decodes the version-independent replay header from the user-data block.
pub trait HeaderDecoder: Send + Sync {
    fn decode_header(&self, user_data: &[u8]) -> Result<Header, DecodeError>;
}

/// Decoder for the sections of one protocol version.
///
/// Implementations are allowed to trust their input: sessions contain any
/// panic raised while decoding.
pub trait Protocol: Send + Sync {
    /// Base build this protocol decodes
    fn base_build(&self) -> u32;

    fn decode_details(&self, data: &[u8]) -> Result<Details, DecodeError>;
    fn decode_init_data(&self, data: &[u8]) -> Result<InitData, DecodeError>;
    fn decode_attributes_events(&self, data: &[u8]) -> Result<AttributesEvents, DecodeError>;

    fn decode_game_events(&self, data: &[u8]) -> DecodedEvents;
    fn decode_message_events(&self, data: &[u8]) -> DecodedEvents;
    fn decode_tracker_events(&self, data: &[u8]) -> DecodedEvents;
}

/// How a protocol was picked for a base build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    /// No exact match; the newest known protocol is used
    Fallback { requested: u32 },
}

/// Known protocols, keyed by base build
pub struct ProtocolRegistry {
    header_decoder: Box<dyn HeaderDecoder>,
    protocols: BTreeMap<u32, Arc<dyn Protocol>>,
}

impl ProtocolRegistry {
    pub fn new(header_decoder: impl HeaderDecoder + 'static) -> Self {
        Self {
            header_decoder: Box::new(header_decoder),
            protocols: BTreeMap::new(),
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, protocol: Arc<dyn Protocol>) -> Self {
        self.register(protocol);
        self
    }

    /// Register a protocol, returning the one it replaces
    pub fn register(&mut self, protocol: Arc<dyn Protocol>) -> Option<Arc<dyn Protocol>> {
        self.protocols.insert(protocol.base_build(), protocol)
    }

    pub fn get(&self, base_build: u32) -> Option<&Arc<dyn Protocol>> {
        self.protocols.get(&base_build)
    }

    /// Newest registered base build
    pub fn max_base_build(&self) -> Option<u32> {
        self.protocols.keys().next_back().copied()
    }

    /// Exact match for `base_build`, else the newest known protocol.
    pub fn resolve(&self, base_build: u32) -> Option<(Arc<dyn Protocol>, Resolution)> {
        if let Some(p) = self.protocols.get(&base_build) {
            return Some((Arc::clone(p), Resolution::Exact));
        }
        self.protocols.values().next_back().map(|p| {
            (
                Arc::clone(p),
                Resolution::Fallback {
                    requested: base_build,
                },
            )
        })
    }

    pub fn decode_header(&self, user_data: &[u8]) -> Result<Header, DecodeError> {
        self.header_decoder.decode_header(user_data)
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

impl std::fmt::Debug for ProtocolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolRegistry")
            .field("base_builds", &self.protocols.keys().collect::<Vec<_>>())
            .finish()
    }
}
