//! Tracker event analytics
//!
//! Derives per-player start location, start orientation, spending quotient
//! and supply-capped ratio from the tracker event stream.

use hashbrown::HashMap;
use sc2bank_shared::{Event, InitData};
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Tracker event ids used by the analytics pass
pub mod event_id {
    pub const PLAYER_STATS: u32 = 0;
    pub const UNIT_BORN: u32 = 1;
    pub const PLAYER_SETUP: u32 = 9;
}

/// One hour on the clock face
const ONE_HOUR: f64 = PI / 6.0;
const FULL_TURN: f64 = ONE_HOUR * 12.0;
const HOUR_EPSILON: f64 = 1e-9;

/// Starting structures of the three races
const MAIN_BUILDINGS: [&str; 3] = ["Nexus", "CommandCenter", "Hatchery"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartLocation {
    pub x: i64,
    pub y: i64,
}

/// Analytics for one player, keyed by tracker player id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDescriptor {
    pub player_id: i64,
    /// Index into the lobby slot list
    pub slot_id: i64,
    pub user_id: i64,
    pub start_location: Option<StartLocation>,
    /// Clock position (1..=12) of the start location seen from map center
    pub start_dir: Option<u8>,
    /// Spending quotient; `None` without stats samples
    pub sq: Option<i32>,
    /// Share of stats samples taken while supply capped; `None` without samples
    pub supply_capped_percent: Option<i32>,
}

impl PlayerDescriptor {
    fn new(player_id: i64, slot_id: i64, user_id: i64) -> Self {
        Self {
            player_id,
            slot_id,
            user_id,
            start_location: None,
            start_dir: None,
            sq: None,
            supply_capped_percent: None,
        }
    }
}

#[derive(Debug, Default)]
struct Stats {
    samples: i64,
    unspents: i64,
    incomes: i64,
    sup_capped: i64,
}

/// Player descriptors computed from a tracker event stream.
#[derive(Debug, Clone, Default)]
pub struct TrackerAnalytics {
    players: BTreeMap<i64, PlayerDescriptor>,
    /// account handle -> player id
    by_toon: HashMap<String, i64>,
}

impl TrackerAnalytics {
    pub fn analyze(events: &[Event], init_data: &InitData) -> Self {
        let mut players: BTreeMap<i64, PlayerDescriptor> = BTreeMap::new();
        let mut stats: HashMap<i64, Stats> = HashMap::new();

        // Player setup events come first, all at loop 0
        for e in events.iter().take_while(|e| e.game_loop == 0) {
            if e.id != event_id::PLAYER_SETUP {
                continue;
            }
            let Some(pid) = e.int("playerId") else {
                continue;
            };
            players.entry(pid).or_insert_with(|| {
                stats.insert(pid, Stats::default());
                PlayerDescriptor::new(
                    pid,
                    e.int("slotId").unwrap_or_default(),
                    e.int("userId").unwrap_or_default(),
                )
            });
        }

        let (cx, cy) = init_data.game_description.map_center();

        for e in events {
            if e.game_loop == 0 && e.id == event_id::UNIT_BORN {
                let is_main = e
                    .string("unitTypeName")
                    .is_some_and(|name| MAIN_BUILDINGS.contains(&name.as_str()));
                let pd = e
                    .int("controlPlayerId")
                    .and_then(|pid| players.get_mut(&pid));
                if let (true, Some(pd)) = (is_main, pd) {
                    let x = e.int("x").unwrap_or_default();
                    let y = e.int("y").unwrap_or_default();
                    pd.start_location = Some(StartLocation { x, y });
                    let angle = (y as f64 - cy as f64).atan2(x as f64 - cx as f64);
                    pd.start_dir = Some(angle_to_clock(angle));
                }
            }

            if e.id == event_id::PLAYER_STATS {
                let st = e.int("playerId").and_then(|pid| stats.get_mut(&pid));
                let (Some(st), Some(ss)) = (st, e.structv("stats")) else {
                    continue;
                };
                let field = |name: &str| ss.int(name).unwrap_or_default();

                st.samples += 1;
                st.unspents = st.unspents.saturating_add(
                    field("scoreValueMineralsCurrent")
                        .saturating_add(field("scoreValueVespeneCurrent")),
                );
                st.incomes = st.incomes.saturating_add(
                    field("scoreValueMineralsCollectionRate")
                        .saturating_add(field("scoreValueVespeneCollectionRate")),
                );
                if field("scoreValueFoodUsed") >= field("scoreValueFoodMade") {
                    st.sup_capped += 1;
                }
            }
        }

        for (pid, pd) in players.iter_mut() {
            let Some(st) = stats.get(pid).filter(|st| st.samples > 0) else {
                continue;
            };
            pd.sq = Some(calc_sq(st.unspents / st.samples, st.incomes / st.samples));
            pd.supply_capped_percent = Some((st.sup_capped * 100 / st.samples) as i32);
        }

        let mut by_toon = HashMap::new();
        for pd in players.values() {
            let slot = usize::try_from(pd.slot_id)
                .ok()
                .and_then(|idx| init_data.lobby.slots.get(idx));
            match slot {
                Some(slot) if !slot.toon_handle.is_empty() => {
                    by_toon
                        .entry(slot.toon_handle.clone())
                        .or_insert(pd.player_id);
                }
                Some(_) => {}
                None => tracing::debug!(
                    player_id = pd.player_id,
                    slot_id = pd.slot_id,
                    "Player setup references a slot outside the lobby"
                ),
            }
        }

        tracing::debug!(
            players = players.len(),
            handles = by_toon.len(),
            "Tracker analytics computed"
        );

        Self { players, by_toon }
    }

    pub fn player(&self, player_id: i64) -> Option<&PlayerDescriptor> {
        self.players.get(&player_id)
    }

    /// Descriptor of the player sitting in the slot with account `handle`
    pub fn player_by_toon(&self, handle: &str) -> Option<&PlayerDescriptor> {
        self.by_toon
            .get(handle)
            .and_then(|pid| self.players.get(pid))
    }

    /// Descriptors in player id order
    pub fn players(&self) -> impl Iterator<Item = &PlayerDescriptor> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Converts an angle given in radians to an hour clock value in 1..=12.
///
/// - PI/2 => 12 (o'clock)
/// - 0 => 3
/// - PI => 9
pub fn angle_to_clock(angle: f64) -> u8 {
    if !angle.is_finite() {
        return 12;
    }

    // Shift by 3:30 (12 o'clock starts at 11:30) and turn clockwise
    let angle = -angle.rem_euclid(FULL_TURN) + ONE_HOUR * 3.5;
    let mut hours = (angle / ONE_HOUR).rem_euclid(12.0);

    // Snap rounding noise so an hour boundary maps the same on every turn
    let nearest = hours.round();
    if (hours - nearest).abs() < HOUR_EPSILON {
        hours = nearest;
    }

    match hours as u8 {
        0 | 12 => 12,
        hour => hour,
    }
}

/// Spending quotient.
///
/// SQ = 35 * (0.00137 * I - ln(U)) + 240, where U is the average unspent
/// resources and I the average income, both minerals plus vespene.
pub fn calc_sq(unspent_resources: i64, income: i64) -> i32 {
    let sq = 35.0 * (0.00137 * income as f64 - (unspent_resources as f64).ln()) + 240.0;
    sq.round() as i32
}
