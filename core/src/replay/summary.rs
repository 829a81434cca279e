//! Printable replay overview

use std::fmt;

use sc2bank_shared::{GameResult, GameSpeed};
use serde::Serialize;

use super::session::ReplaySession;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPlayer {
    pub name: String,
    pub race: String,
    /// 1-based team number
    pub team: i64,
    pub result: GameResult,
    pub toon: String,
    #[serde(skip)]
    race_letter: char,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub version: String,
    pub loops: u64,
    pub duration: String,
    pub title: String,
    pub speed: GameSpeed,
    pub game_events: usize,
    pub message_events: usize,
    pub tracker_events: usize,
    pub game_events_err: bool,
    pub message_events_err: bool,
    pub tracker_events_err: bool,
    pub players: Vec<SummaryPlayer>,
}

impl ReplaySummary {
    pub fn from_session(session: &ReplaySession) -> Self {
        let header = session.header();
        let details = session.details();

        let players = details
            .players
            .iter()
            .map(|p| SummaryPlayer {
                name: p.name.clone(),
                race: p.race.clone(),
                team: p.team_id + 1,
                result: p.result,
                toon: p.toon.to_string(),
                race_letter: p.race_letter(),
            })
            .collect();

        Self {
            version: header.version_string(),
            loops: header.loops,
            duration: header.duration_string(),
            title: details.title.clone(),
            speed: details.game_speed,
            game_events: session.game_events().len(),
            message_events: session.message_events().len(),
            tracker_events: session.tracker_events().len(),
            game_events_err: session.game_events_err(),
            message_events_err: session.message_events_err(),
            tracker_events_err: session.tracker_events_err(),
            players,
        }
    }
}

fn partial(err: bool) -> &'static str {
    if err { " (partial)" } else { "" }
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version:        {}", self.version)?;
        writeln!(f, "Loops:          {}", self.loops)?;
        writeln!(f, "Length:         {}", self.duration)?;
        writeln!(f, "Map:            {}", self.title)?;
        writeln!(f, "Speed:          {}", self.speed)?;
        writeln!(
            f,
            "Game events:    {}{}",
            self.game_events,
            partial(self.game_events_err)
        )?;
        writeln!(
            f,
            "Message events: {}{}",
            self.message_events,
            partial(self.message_events_err)
        )?;
        writeln!(
            f,
            "Tracker events: {}{}",
            self.tracker_events,
            partial(self.tracker_events_err)
        )?;
        writeln!(f, "Players:")?;
        for p in &self.players {
            writeln!(
                f,
                "\tName: {:<20}, Race: {}, Team: {}, Result: {}, Toon: {}",
                p.name, p.race_letter, p.team, p.result, p.toon
            )?;
        }
        Ok(())
    }
}
