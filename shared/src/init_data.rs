//! Replay init data (the initial lobby)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InitData {
    pub game_description: GameDescription,
    pub lobby: LobbyState,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameDescription {
    pub map_size_x: i64,
    pub map_size_y: i64,
    pub max_players: i64,
    pub max_observers: i64,
}

impl GameDescription {
    /// Map center, integer-divided like the engine does
    pub fn map_center(&self) -> (i64, i64) {
        (self.map_size_x / 2, self.map_size_y / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LobbyState {
    /// Lobby participants: players and observers. May be longer than the
    /// player list of the game details.
    pub slots: Vec<Slot>,
}

/// A lobby participant entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Slot {
    /// Absent for computer and open slots
    pub user_id: Option<i64>,
    /// Account handle, empty for computer and open slots
    pub toon_handle: String,
    pub control: i64,
    pub team_id: i64,
    pub observe: i64,
}

impl LobbyState {
    /// Index and slot of the first human slot belonging to `user_id`.
    pub fn slot_by_user_id(&self, user_id: i64) -> Option<(usize, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, s)| !s.toon_handle.is_empty() && s.user_id == Some(user_id))
    }
}
