// Ledger Auditor - independent third-party verification of snapshots
//
// The auditor works directly on raw snapshot JSON rather than through the
// ledger types, so a buggy or compromised ledger implementation cannot
// vouch for itself. It reproduces the canonical preimage byte-for-byte
// and never raises on malformed input: every outcome is a structured
// result.

use crate::canonical::{canonical_string, sha3_256_hex, sha3_512_hex, strip_keys};
use crate::ledger::{ContinuityLedger, Snapshot, VerifyFault, VerifyReport};
use serde::Serialize;
use serde_json::Value;

/// Pure tip-and-length comparison of two snapshots. Finding the exact
/// fork point is out of scope.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiffReport {
    pub diverged: bool,
    pub a_length: usize,
    pub b_length: usize,
    pub a_last_hash: Option<String>,
    pub b_last_hash: Option<String>,
    pub delta: usize,
}

/// Human-readable audit summary, rendered by `report`.
#[derive(Clone, Debug, Serialize)]
struct AuditSummary {
    node_id: String,
    length: usize,
    result: VerifyReport,
}

/// Stateless snapshot verifier and comparator.
pub struct LedgerAuditor;

impl LedgerAuditor {
    /// Independently recompute every chain hash, prev/curr linkage, and
    /// signature in a snapshot. Rebroadcast entries (`event_type`
    /// containing `@`) carry an opaque correlator in `signature`, so
    /// their signature check is skipped.
    pub fn verify_snapshot(snapshot: &Value) -> VerifyReport {
        let chain = match snapshot.get("chain").and_then(Value::as_array) {
            Some(chain) => chain,
            None => return VerifyReport::fault(VerifyFault::MissingChain),
        };
        let node_id = snapshot.get("node_id").and_then(Value::as_str).unwrap_or("");

        let count = chain.len();
        let mut prev: Option<&str> = None;

        for (i, entry) in chain.iter().enumerate() {
            let stored_hash = entry.get("curr_hash").and_then(Value::as_str);
            let preimage = strip_keys(entry, &["curr_hash", "signature"]);
            let recomputed = sha3_512_hex(canonical_string(&preimage).as_bytes());
            if stored_hash != Some(recomputed.as_str()) {
                return VerifyReport::fault_at(VerifyFault::HashMismatch, i, count);
            }

            let prev_field = entry.get("prev_hash").and_then(Value::as_str);
            if prev_field != prev {
                return VerifyReport::fault_at(VerifyFault::LinkBroken, i, count);
            }

            let event_type = entry.get("event_type").and_then(Value::as_str).unwrap_or("");
            if !event_type.contains('@') {
                let seal_preimage = strip_keys(entry, &["signature"]);
                let seal = sha3_512_hex(canonical_string(&seal_preimage).as_bytes());
                let expected = sha3_256_hex(format!("{node_id}:{seal}").as_bytes());
                let stored_sig = entry.get("signature").and_then(Value::as_str);
                if stored_sig != Some(expected.as_str()) {
                    return VerifyReport::fault_at(VerifyFault::BadSignature, i, count);
                }
            }

            prev = stored_hash;
        }

        VerifyReport::ok(count)
    }

    /// Cross-check: restore the snapshot into a fresh ledger and run the
    /// ledger's own `verify_chain`. Semantically equivalent to
    /// `verify_snapshot` but exercises the ledger code path.
    pub fn replay(snapshot: &Value) -> VerifyReport {
        let parsed = match Snapshot::from_value(snapshot) {
            Ok(parsed) => parsed,
            Err(_) => return VerifyReport::fault(VerifyFault::MissingChain),
        };
        let mut ledger = ContinuityLedger::new(&parsed.node_id);
        ledger.restore(parsed);
        ledger.verify_chain()
    }

    /// Compare two snapshots by chain length and tip hash.
    pub fn diff(a: &Value, b: &Value) -> DiffReport {
        let a_length = chain_length(a);
        let b_length = chain_length(b);
        let a_last_hash = last_hash(a);
        let b_last_hash = last_hash(b);

        DiffReport {
            diverged: a_length != b_length || a_last_hash != b_last_hash,
            delta: a_length.abs_diff(b_length),
            a_length,
            b_length,
            a_last_hash,
            b_last_hash,
        }
    }

    /// Render a pretty-printed JSON audit summary for a snapshot.
    pub fn report(snapshot: &Value) -> String {
        let summary = AuditSummary {
            node_id: snapshot
                .get("node_id")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            length: chain_length(snapshot),
            result: Self::verify_snapshot(snapshot),
        };
        serde_json::to_string_pretty(&summary).unwrap_or_default()
    }
}

fn chain_length(snapshot: &Value) -> usize {
    snapshot
        .get("length")
        .and_then(Value::as_u64)
        .map(|length| length as usize)
        .or_else(|| snapshot.get("chain").and_then(Value::as_array).map(Vec::len))
        .unwrap_or(0)
}

fn last_hash(snapshot: &Value) -> Option<String> {
    snapshot
        .get("last_hash")
        .and_then(Value::as_str)
        .map(str::to_string)
}
