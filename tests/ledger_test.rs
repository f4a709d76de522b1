// Continuity Ledger Tests
// Append integrity, tamper detection, snapshot round trips, file I/O

use ghx_continuity::{ContinuityLedger, LedgerError, Snapshot, VerifyFault};
use serde_json::json;
use tempfile::TempDir;

fn three_event_ledger() -> ContinuityLedger {
    let mut ledger = ContinuityLedger::new("NA");
    ledger.append_event("startup", json!({"ok": true})).unwrap();
    ledger.append_event("heartbeat", json!({"c": 0.99})).unwrap();
    ledger.append_event("sync", json!({"phase": "a"})).unwrap();
    ledger
}

/// Re-materialize a ledger from a snapshot after mutating one entry.
fn tampered(ledger: &ContinuityLedger, mutate: impl FnOnce(&mut Snapshot)) -> ContinuityLedger {
    let mut snapshot = ledger.snapshot();
    mutate(&mut snapshot);
    let mut out = ContinuityLedger::new(snapshot.node_id.as_str());
    out.restore(snapshot);
    out
}

// ============================================================================
// APPEND INTEGRITY
// ============================================================================

#[test]
fn test_appends_always_verify() {
    let mut ledger = ContinuityLedger::new("NA");
    for i in 0..50 {
        ledger.append_event("tick", json!({"i": i, "odd": i % 2 == 1})).unwrap();
        let report = ledger.verify_chain();
        assert!(report.verified, "chain broke at append {i}");
        assert_eq!(report.count, i + 1);
    }
}

#[test]
fn test_seq_and_linkage_monotonic() {
    let ledger = three_event_ledger();
    let chain = ledger.chain();

    assert_eq!(chain[0].seq, 1);
    assert_eq!(chain[1].seq, 2);
    assert_eq!(chain[2].seq, 3);
    assert_eq!(chain[0].prev_hash, None);
    assert_eq!(chain[1].prev_hash.as_deref(), Some(chain[0].curr_hash.as_str()));
    assert_eq!(chain[2].prev_hash.as_deref(), Some(chain[1].curr_hash.as_str()));
    assert_eq!(ledger.last_hash(), Some(chain[2].curr_hash.as_str()));
}

#[test]
fn test_event_ids_unique_within_ledger() {
    let ledger = three_event_ledger();
    let mut ids: Vec<&str> = ledger.chain().iter().map(|e| e.event_id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_empty_event_type_is_invalid_argument() {
    let mut ledger = ContinuityLedger::new("NA");
    assert!(matches!(
        ledger.append_event("", json!({})),
        Err(LedgerError::EmptyEventType)
    ));
}

// ============================================================================
// TAMPER DETECTION
// ============================================================================

#[test]
fn test_tampered_meta_hash_mismatch() {
    let ledger = tampered(&three_event_ledger(), |snap| {
        snap.chain[1].meta = json!({"c": 0.01});
    });

    let report = ledger.verify_chain();
    assert!(!report.verified);
    assert_eq!(report.error, Some(VerifyFault::HashMismatch));
    assert_eq!(report.index, Some(1));
}

#[test]
fn test_tampered_event_type_detected() {
    let ledger = tampered(&three_event_ledger(), |snap| {
        snap.chain[0].event_type = "shutdown".to_string();
    });
    let report = ledger.verify_chain();
    assert_eq!(report.error, Some(VerifyFault::HashMismatch));
    assert_eq!(report.index, Some(0));
}

#[test]
fn test_tampered_origin_detected() {
    let ledger = tampered(&three_event_ledger(), |snap| {
        snap.chain[2].origin = "NB".to_string();
    });
    let report = ledger.verify_chain();
    assert_eq!(report.error, Some(VerifyFault::HashMismatch));
    assert_eq!(report.index, Some(2));
}

#[test]
fn test_tampered_prev_hash_detected_at_or_before_index() {
    let ledger = tampered(&three_event_ledger(), |snap| {
        snap.chain[2].prev_hash = Some("00".repeat(64));
    });
    let report = ledger.verify_chain();
    assert!(!report.verified);
    // prev_hash is part of the hash preimage, so this surfaces as a
    // hash mismatch at the mutated entry
    assert_eq!(report.error, Some(VerifyFault::HashMismatch));
    assert!(report.index.unwrap() <= 2);
}

#[test]
fn test_tampered_curr_hash_breaks_chain() {
    let ledger = tampered(&three_event_ledger(), |snap| {
        snap.chain[1].curr_hash = "ff".repeat(64);
    });
    let report = ledger.verify_chain();
    assert_eq!(report.error, Some(VerifyFault::HashMismatch));
    assert_eq!(report.index, Some(1));
}

#[test]
fn test_forged_signature_detected() {
    let ledger = tampered(&three_event_ledger(), |snap| {
        snap.chain[1].signature = "deadbeef".to_string();
    });
    let report = ledger.verify_chain();
    assert_eq!(report.error, Some(VerifyFault::BadSignature));
    assert_eq!(report.index, Some(1));
}

#[test]
fn test_reordered_entries_break_linkage() {
    let ledger = tampered(&three_event_ledger(), |snap| {
        snap.chain.swap(0, 1);
    });
    let report = ledger.verify_chain();
    assert!(!report.verified);
    assert_eq!(report.error, Some(VerifyFault::LinkBroken));
    assert_eq!(report.index, Some(0));
}

// ============================================================================
// SNAPSHOT ROUND TRIP
// ============================================================================

#[test]
fn test_snapshot_restore_preserves_verification() {
    let mut ledger = ContinuityLedger::new("NA");
    for i in 0..5 {
        ledger.append_event("pulse", json!({"n": i})).unwrap();
    }

    // Serialize to JSON text and parse back, as a transport would
    let text = serde_json::to_string(&ledger.snapshot()).unwrap();
    let parsed: Snapshot = serde_json::from_str(&text).unwrap();

    let mut restored = ContinuityLedger::new("fresh");
    restored.restore(parsed);

    assert_eq!(restored.node_id(), "NA");
    assert_eq!(restored.last_hash(), ledger.last_hash());
    assert_eq!(restored.verify_chain(), ledger.verify_chain());
    assert!(restored.verify_chain().verified);
}

#[test]
fn test_snapshot_of_unicode_meta_round_trips() {
    let mut ledger = ContinuityLedger::new("NA");
    ledger
        .append_event("glyph", json!({"field": "ψκT", "Φ": 0.5}))
        .unwrap();

    let text = serde_json::to_string(&ledger.snapshot()).unwrap();
    let parsed: Snapshot = serde_json::from_str(&text).unwrap();
    let mut restored = ContinuityLedger::new("fresh");
    restored.restore(parsed);

    assert!(restored.verify_chain().verified);
}

// ============================================================================
// FILE EXPORT / LOAD
// ============================================================================

#[test]
fn test_export_and_load_chain() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chain.json");

    let ledger = three_event_ledger();
    ledger.export_chain(&path).unwrap();

    let loaded = ContinuityLedger::load_chain(&path).unwrap();
    assert_eq!(loaded.node_id(), "NA");
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.last_hash(), ledger.last_hash());
    assert!(loaded.verify_chain().verified);
}

#[test]
fn test_load_chain_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ContinuityLedger::load_chain(temp_dir.path().join("absent.json"));
    assert!(matches!(result, Err(LedgerError::Io(_))));
}

#[test]
fn test_load_chain_malformed_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("garbage.json");
    std::fs::write(&path, "{not json").unwrap();

    let result = ContinuityLedger::load_chain(&path);
    assert!(matches!(result, Err(LedgerError::Parse(_))));
}
