//! Game details (overall replay details and the player roster)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall replay details
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Details {
    /// Map title
    pub title: String,
    pub game_speed: GameSpeed,
    /// Players in order, neutral force excluded
    pub players: Vec<Player>,
}

impl Details {
    /// First player whose toon renders to `handle`
    pub fn player_by_toon(&self, handle: &str) -> Option<&Player> {
        if handle.is_empty() {
            return None;
        }
        self.players.iter().find(|p| p.toon.to_string() == handle)
    }
}

/// Game speed setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameSpeed {
    Slower,
    Slow,
    Normal,
    Fast,
    #[default]
    Faster,
    /// Code not known to this build
    Unknown(i64),
}

impl GameSpeed {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => GameSpeed::Slower,
            1 => GameSpeed::Slow,
            2 => GameSpeed::Normal,
            3 => GameSpeed::Fast,
            4 => GameSpeed::Faster,
            other => GameSpeed::Unknown(other),
        }
    }
}

impl fmt::Display for GameSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameSpeed::Slower => f.write_str("Slower"),
            GameSpeed::Slow => f.write_str("Slow"),
            GameSpeed::Normal => f.write_str("Normal"),
            GameSpeed::Fast => f.write_str("Fast"),
            GameSpeed::Faster => f.write_str("Faster"),
            GameSpeed::Unknown(code) => write!(f, "Unknown({code})"),
        }
    }
}

/// Player outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameResult {
    #[default]
    Unknown,
    Victory,
    Defeat,
    Tie,
}

impl GameResult {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => GameResult::Victory,
            2 => GameResult::Defeat,
            3 => GameResult::Tie,
            _ => GameResult::Unknown,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameResult::Unknown => "Unknown",
            GameResult::Victory => "Victory",
            GameResult::Defeat => "Defeat",
            GameResult::Tie => "Tie",
        };
        f.write_str(s)
    }
}

/// Account identity of a player
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Toon {
    pub region: i64,
    pub program_id: String,
    pub realm: i64,
    pub id: i64,
}

impl fmt::Display for Toon {
    /// `region-program-realm-id`, the same form lobby slots use as handle.
    /// Computer players have an all-zero toon and render as empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id == 0 && self.program_id.is_empty() {
            return Ok(());
        }
        write!(
            f,
            "{}-{}-{}-{}",
            self.region, self.program_id, self.realm, self.id
        )
    }
}

/// A player as listed in the game details
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Localized race name (e.g. "Protoss")
    pub race: String,
    pub team_id: i64,
    pub result: GameResult,
    pub toon: Toon,
}

impl Player {
    /// First letter of the race, `?` when unknown
    pub fn race_letter(&self) -> char {
        self.race.chars().next().unwrap_or('?')
    }
}
