//! Integration tests for SC2 bank recovery
//!
//! Tests the full pipeline: container bytes, session, analytics, bank
//! reconstruction and export.

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::bank::{BankExporter, BankNode, BankValue, reconstruct, reconstruct_session};
    use crate::config::{Config, OutputConfig};
    use crate::replay::{ReplaySession, angle_to_clock};
    use crate::test_utils::{
        FakeOpener, bank_deferred, bank_file, bank_key, bank_value, provenance, recovered_at,
        replay_archive, test_details, test_init_data, test_registry,
    };

    // ============================================================================
    // Full Pipeline Tests
    // ============================================================================

    #[test]
    fn test_replay_bytes_to_bank_files() {
        let dir = tempfile::tempdir().unwrap();
        let (opener, bytes) = FakeOpener::wrap(replay_archive());
        let config = Config {
            output: OutputConfig {
                dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut session = ReplaySession::open(
            Cursor::new(bytes),
            &opener,
            &test_registry(),
            config.decode.streams(),
        )
        .unwrap();
        let banks = reconstruct_session(&session);
        let written = BankExporter::new(config.output.clone())
            .export(&session, &banks, recovered_at())
            .unwrap();
        session.close();

        assert_eq!(written.len(), 2);
        let alice = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(
            alice,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!--Bank recovered from a replay-->\n\
             <!--2026-10-14T12:30:00Z-->\n\
             <!--Title: Bank Test Map-->\n\
             <!--Version: 5.0.11.88500-->\n\
             <!--Loops: 12064-->\n\
             <!--Length: 12m34s-->\n\
             <!--Player: 2-S2-1-100-->\n\
             <Bank version=\"1\">\n  \
               <Section name=\"Hero\">\n    \
                 <Key name=\"level\">\n      \
                   <level int=\"12\"/>\n    \
                 </Key>\n    \
                 <Key name=\"name\">\n      \
                   <name string=\"Alice\"/>\n    \
                 </Key>\n    \
                 <Key name=\"gold\">\n      \
                   <gold fixed=\"1500.5\"/>\n    \
                 </Key>\n  \
               </Section>\n  \
               <Signature value=\"12AB00FF\"/>\n\
             </Bank>\n"
        );

        let bob = std::fs::read_to_string(&written[1]).unwrap();
        assert!(bob.contains("<!--Player: 2-S2-1-200-->"));
        assert!(bob.contains("<level int=\"3\"/>"));
        assert!(!bob.contains("Signature"));
    }

    #[test]
    fn test_owner_joined_through_slot_handle() {
        let session = crate::test_utils::test_session(crate::replay::DecodeStreams::all());
        let banks = reconstruct_session(&session);

        let bob = &banks[1].banks["RPGSave"];
        assert_eq!(bob.owner().slot_index, 1);
        assert_eq!(bob.owner().user_id, Some(1));
        assert_eq!(
            bob.owner().player.as_ref().map(|p| p.name.as_str()),
            Some("Bob")
        );
        assert!(banks[2].is_empty());
    }

    // ============================================================================
    // Tracker Analytics Tests
    // ============================================================================

    #[test]
    fn test_session_tracker_analytics() {
        let session = crate::test_utils::test_session(crate::replay::DecodeStreams::all());
        let analytics = session.tracker_analytics().unwrap();

        let alice = analytics.player_by_toon("2-S2-1-100").unwrap();
        assert_eq!(alice.player_id, 1);
        assert_eq!(alice.start_dir, Some(angle_to_clock(5f64.atan2(15.0))));
        assert_eq!(alice.start_dir, Some(2));
        assert_eq!(alice.sq, Some(127));
        assert_eq!(alice.supply_capped_percent, Some(50));

        let bob = analytics.player_by_toon("2-S2-1-200").unwrap();
        assert_eq!(bob.start_dir, Some(8));
        assert_eq!(bob.sq, Some(25));
        assert_eq!(bob.supply_capped_percent, Some(50));
        assert!(analytics.player_by_toon("").is_none());
    }

    // ============================================================================
    // Deferred Value Tests
    // ============================================================================

    #[test]
    fn test_deferred_value_rendered_from_next_event() {
        let events = [
            bank_file(0, "Deferred"),
            bank_key(0, "k"),
            bank_deferred(0, "k"),
            bank_value(0, "k", 5, "Marine"),
        ];
        let banks = reconstruct(&events, &test_init_data(), &test_details());
        let bank = &banks[0].banks["Deferred"];

        // Both events are kept in stream order
        assert_eq!(bank.nodes().len(), 3);
        assert!(matches!(
            bank.nodes()[1],
            BankNode::Value {
                value: BankValue::Deferred,
                ..
            }
        ));

        // The key has no section, so it sits on the root with the resolved value
        let xml = crate::bank::render(bank, &provenance()).to_xml(2).unwrap();
        assert!(xml.contains(
            "<Bank version=\"1\">\n  \
               <Key name=\"k\">\n    \
                 <k unit=\"Marine\"/>\n  \
               </Key>\n\
             </Bank>\n"
        ));
        assert_eq!(xml.matches("unit=").count(), 1);

        let events = [
            bank_file(0, "Deferred"),
            crate::test_utils::bank_section(0, "s"),
            bank_key(0, "k"),
            bank_deferred(0, "k"),
            bank_value(0, "k", 5, "Marine"),
        ];
        let banks = reconstruct(&events, &test_init_data(), &test_details());
        let xml = crate::bank::render(&banks[0].banks["Deferred"], &provenance())
            .to_xml(2)
            .unwrap();
        assert!(xml.contains(
            "<Section name=\"s\">\n    \
               <Key name=\"k\">\n      \
                 <k unit=\"Marine\"/>"
        ));
        assert_eq!(xml.matches("unit=").count(), 1);
    }

    // ============================================================================
    // Determinism Tests
    // ============================================================================

    #[test]
    fn test_same_replay_same_bytes() {
        let render_all = || -> Vec<Vec<u8>> {
            let session = crate::test_utils::test_session(crate::replay::DecodeStreams::all());
            reconstruct_session(&session)
                .iter()
                .flat_map(|slot| slot.banks.values())
                .map(|bank| {
                    let mut out = Vec::new();
                    bank.write_to(&mut out, &provenance(), 2).unwrap();
                    out
                })
                .collect()
        };
        assert_eq!(render_all(), render_all());
    }
}
