//! Replay header (game version and length)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Game loops per second of game time
pub const LOOPS_PER_SECOND: u64 = 16;

/// Game version that recorded the replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
    pub build: u32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.revision, self.build
        )
    }
}

/// Decoded replay header
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub version: Version,
    /// Engine build selecting the wire protocol
    pub base_build: u32,
    /// Length of the replay in game loops
    pub loops: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<u8>>,
}

impl Header {
    /// Version in "major.minor.revision.build" form
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Game-time duration of the replay
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.loops.saturating_mul(1000) / LOOPS_PER_SECOND)
    }

    /// Duration rendered like `1h2m3.5s`, omitting leading zero units
    pub fn duration_string(&self) -> String {
        format_duration(self.duration())
    }
}

pub fn format_duration(d: Duration) -> String {
    let total_ms = d.as_millis();
    if total_ms == 0 {
        return "0s".to_string();
    }
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if millis == 0 {
        out.push_str(&format!("{seconds}s"));
    } else {
        let frac = format!("{millis:03}");
        out.push_str(&format!("{seconds}.{}s", frac.trim_end_matches('0')));
    }
    out
}
