//! Replay session error types

/// Fatal failure constructing a [`ReplaySession`](super::ReplaySession).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// Not a replay container, or a required section is missing
    #[error("invalid SC2Replay file")]
    InvalidReplayFile,

    /// Valid container, but no protocol can decode it
    #[error("unsupported replay version (base build {base_build})")]
    UnsupportedReplayVersion { base_build: u32 },

    /// The decoder failed on malformed input
    #[error("decoding replay failed")]
    DecodingFailed,
}
