//! Writing reconstructed banks to disk
//!
//! Layout: `<dir>/<slot index>__<toon handle>/<bank name>.<extension>`

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::document::BankDocument;
use super::reconstruct::SlotBanks;
use super::writer::BankProvenance;
use crate::config::OutputConfig;
use crate::replay::ReplaySession;

pub struct BankExporter {
    config: OutputConfig,
}

impl BankExporter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Output path of `bank` owned by `slot`
    pub fn bank_path(&self, slot: &SlotBanks, bank: &BankDocument) -> PathBuf {
        let dir = format!(
            "{}__{}",
            slot.slot_index,
            sanitize_component(&slot.toon_handle)
        );
        let mut name = sanitize_component(bank.name());
        if matches!(name.as_str(), "" | "." | "..") {
            name = format!("_{name}");
        }
        let file = if self.config.extension.is_empty() {
            name
        } else {
            format!("{name}.{}", self.config.extension)
        };
        self.config.dir.join(dir).join(file)
    }

    /// Write every bank, returning the written paths in order.
    ///
    /// Stops at the first I/O error.
    pub fn export(
        &self,
        session: &ReplaySession,
        slot_banks: &[SlotBanks],
        recovered_at: DateTime<Utc>,
    ) -> io::Result<Vec<PathBuf>> {
        let provenance = BankProvenance::from_session(session, recovered_at);
        let mut written = Vec::new();
        for slot in slot_banks {
            for bank in slot.banks.values() {
                let path = self.bank_path(slot, bank);
                bank.save_as_file(&path, &provenance, self.config.indent)?;
                tracing::info!(path = %path.display(), "Saved bank");
                written.push(path);
            }
        }
        Ok(written)
    }
}

/// Replace characters that are unsafe in a file name with `_`
pub fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
