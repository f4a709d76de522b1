// Continuity Ledger - single-writer, append-only, hash-linked event chain
//
// Every append seals the new entry with a SHA3-512 chain hash and a
// SHA3-256 node signature, then advances `last_hash`. Entries are never
// modified after appending. Verification walks the chain and recomputes
// hash, linkage, and signature for every entry.

use crate::ledger::entry::{generate_event_id, LedgerEntry};
use crate::ledger::snapshot::Snapshot;
use crate::ledger::verify::{VerifyFault, VerifyReport};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from ledger operations. Verification failures are not errors;
/// they come back as a `VerifyReport`.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Event type must be a non-empty string")]
    EmptyEventType,

    #[error("Ledger file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory append-only event chain for a single node.
#[derive(Clone, Debug)]
pub struct ContinuityLedger {
    node_id: String,
    chain: Vec<LedgerEntry>,
    last_hash: Option<String>,
}

impl ContinuityLedger {
    /// Create an empty ledger for a node.
    pub fn new(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            chain: Vec::new(),
            last_hash: None,
        }
    }

    /// This node's id.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// `curr_hash` of the last entry, or None for an empty chain.
    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }

    /// The full entry sequence.
    pub fn chain(&self) -> &[LedgerEntry] {
        &self.chain
    }

    /// Get an entry by chain index.
    pub fn entry(&self, index: usize) -> Option<&LedgerEntry> {
        self.chain.get(index)
    }

    /// Append a locally-produced event and seal it.
    pub fn append_event(&mut self, event_type: &str, meta: Value) -> Result<LedgerEntry, LedgerError> {
        self.append_entry(event_type, meta, None, None)
    }

    /// Append with explicit origin and/or signature. The federation layer
    /// uses this to carry the originating entry's hash through a
    /// rebroadcast instead of re-signing.
    pub fn append_entry(
        &mut self,
        event_type: &str,
        meta: Value,
        origin: Option<&str>,
        signature: Option<String>,
    ) -> Result<LedgerEntry, LedgerError> {
        if event_type.is_empty() {
            return Err(LedgerError::EmptyEventType);
        }

        let mut entry = LedgerEntry {
            event_id: generate_event_id(),
            seq: self.chain.len() as u64 + 1,
            timestamp: now_secs(),
            event_type: event_type.to_string(),
            meta,
            origin: origin.unwrap_or(&self.node_id).to_string(),
            prev_hash: self.last_hash.clone(),
            curr_hash: String::new(),
            signature: String::new(),
        };

        entry.curr_hash = entry.compute_hash();
        entry.signature = match signature {
            Some(carried) => carried,
            None => entry.compute_signature(&self.node_id),
        };

        self.last_hash = Some(entry.curr_hash.clone());
        self.chain.push(entry.clone());
        Ok(entry)
    }

    /// Walk the chain and recompute every hash, link, and signature.
    /// Stops at the first fault. Rebroadcast entries carry an opaque
    /// correlator in `signature`, so their signature check is skipped.
    pub fn verify_chain(&self) -> VerifyReport {
        let count = self.chain.len();
        let mut prev: Option<&str> = None;

        for (i, entry) in self.chain.iter().enumerate() {
            if entry.compute_hash() != entry.curr_hash {
                return VerifyReport::fault_at(VerifyFault::HashMismatch, i, count);
            }
            if entry.prev_hash.as_deref() != prev {
                return VerifyReport::fault_at(VerifyFault::LinkBroken, i, count);
            }
            if !entry.is_rebroadcast() && entry.compute_signature(&self.node_id) != entry.signature {
                return VerifyReport::fault_at(VerifyFault::BadSignature, i, count);
            }
            prev = Some(entry.curr_hash.as_str());
        }

        VerifyReport::ok(count)
    }

    /// Canonical dump of the ledger state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            node_id: self.node_id.clone(),
            length: self.chain.len(),
            last_hash: self.last_hash.clone(),
            chain: self.chain.clone(),
            verified: self.verify_chain().verified,
        }
    }

    /// Overwrite in-memory state from a snapshot. Does not re-verify;
    /// callers that do not trust the source must run `verify_chain`.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.node_id = snapshot.node_id;
        self.last_hash = snapshot.last_hash;
        self.chain = snapshot.chain;
    }

    /// Write a snapshot of this ledger to a JSON file.
    pub fn export_chain<P: AsRef<Path>>(&self, path: P) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Rebuild a ledger from a snapshot file written by `export_chain`.
    pub fn load_chain<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let raw = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        let mut ledger = Self::new(&snapshot.node_id);
        ledger.restore(snapshot);
        Ok(ledger)
    }

    // Federation merge support. These mutate the chain without resealing:
    // merged entries keep their originating hashes and signatures.

    /// Append a foreign entry as-is.
    pub(crate) fn adopt_entry(&mut self, entry: LedgerEntry) {
        self.chain.push(entry);
    }

    /// Drop entries matching a predicate; returns how many were removed.
    pub(crate) fn prune_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&LedgerEntry) -> bool,
    {
        let before = self.chain.len();
        self.chain.retain(|entry| !pred(entry));
        before - self.chain.len()
    }

    /// Re-order the chain by `(timestamp, curr_hash)` so that all
    /// federation members converge on the same tail after a merge.
    pub(crate) fn normalize_order(&mut self) {
        self.chain.sort_by(|a, b| {
            a.timestamp
                .total_cmp(&b.timestamp)
                .then_with(|| a.curr_hash.cmp(&b.curr_hash))
        });
    }

    /// Point `last_hash` at the current chain tail.
    pub(crate) fn reseat_last_hash(&mut self) {
        self.last_hash = self.chain.last().map(|entry| entry.curr_hash.clone());
    }
}

/// Wall-clock seconds since the unix epoch. Advisory only; `seq` plus
/// hash linkage is the order of record.
fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
