//! Bank reconstruction from game events
//!
//! Banks are set up before the game starts, so only loop 0 is scanned. Each
//! user's `BankFile` event opens a document that the user's following bank
//! events are appended to.

use std::collections::BTreeMap;

use sc2bank_shared::{Details, Event, InitData};
use serde::Serialize;

use super::document::{BankDocument, BankEventKind, BankOwner};
use crate::replay::ReplaySession;

/// Banks of one lobby slot, by bank name
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SlotBanks {
    pub slot_index: usize,
    pub toon_handle: String,
    pub banks: BTreeMap<String, BankDocument>,
}

impl SlotBanks {
    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

/// Rebuild the banks of every lobby slot from a session's game events.
pub fn reconstruct_session(session: &ReplaySession) -> Vec<SlotBanks> {
    reconstruct(session.game_events(), session.init_data(), session.details())
}

/// Rebuild the banks of every lobby slot, one entry per slot.
pub fn reconstruct(
    game_events: &[Event],
    init_data: &InitData,
    details: &Details,
) -> Vec<SlotBanks> {
    let slots = &init_data.lobby.slots;
    let mut out: Vec<SlotBanks> = slots
        .iter()
        .enumerate()
        .map(|(slot_index, slot)| SlotBanks {
            slot_index,
            toon_handle: slot.toon_handle.clone(),
            banks: BTreeMap::new(),
        })
        .collect();
    // Bank the slot's events currently go to
    let mut current: Vec<Option<String>> = vec![None; slots.len()];

    for evt in game_events.iter().take_while(|e| e.game_loop == 0) {
        let Some(kind) = BankEventKind::classify(&evt.name) else {
            continue;
        };
        let Some((slot_index, slot)) = evt
            .user_id
            .and_then(|user_id| init_data.lobby.slot_by_user_id(user_id))
        else {
            tracing::debug!(
                user_id = evt.user_id,
                event = %evt.name,
                "Dropping bank event of a user without a lobby slot"
            );
            continue;
        };

        if kind == BankEventKind::File {
            let owner = BankOwner {
                slot_index,
                user_id: slot.user_id,
                toon_handle: slot.toon_handle.clone(),
                player: details.player_by_toon(&slot.toon_handle).cloned(),
            };
            match BankDocument::from_file_event(evt, owner) {
                Ok(doc) => {
                    let name = doc.name().to_string();
                    out[slot_index].banks.insert(name.clone(), doc);
                    current[slot_index] = Some(name);
                }
                Err(err) => tracing::warn!(%err, "Dropping bank file event"),
            }
            continue;
        }

        let bank = current[slot_index]
            .as_ref()
            .and_then(|name| out[slot_index].banks.get_mut(name));
        let Some(bank) = bank else {
            tracing::debug!(
                slot_index,
                event = %evt.name,
                "Dropping bank event without a preceding bank file"
            );
            continue;
        };
        if let Err(err) = bank.add_event(evt) {
            tracing::warn!(bank = bank.name(), %err, "Dropping malformed bank event");
        }
    }

    let count: usize = out.iter().map(|s| s.banks.len()).sum();
    tracing::debug!(slots = out.len(), banks = count, "Banks reconstructed");
    out
}
