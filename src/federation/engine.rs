// Federation Engine - broadcast, merge, and integrity across nodes
//
// One authoritative local ledger plus handles to peer ledgers. Broadcast
// fans a freshly sealed local event out to every peer as a
// rebroadcast-tagged copy; merge pulls unseen foreign entries back into
// the local chain with dedup and base-over-rebroadcast resolution.
//
// Merged entries keep their originating prev_hash/curr_hash/signature,
// so a merged local chain is a verified *set* of entries rather than a
// strict hash chain. Intra-producer linkage stays auditable at the
// originating ledger.

use crate::canonical::{canonical_string, sha3_512_hex};
use crate::federation::peer::{self, PeerSet, SharedLedger};
use crate::ledger::{LedgerEntry, LedgerError};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

/// Federation-level errors. Per-peer broadcast failures are logged and
/// skipped, never raised.
#[derive(Error, Debug)]
pub enum FederationError {
    #[error("Cannot register the local node as its own peer")]
    SelfPeer,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Outcome of a merge pass over all peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub merged: bool,
    pub local_length: usize,
    pub peer_count: usize,
}

/// Federation-wide root hash summary.
#[derive(Clone, Debug, Serialize)]
pub struct IntegrityReport {
    pub root_hashes: BTreeMap<String, Option<String>>,
    pub federation_hash: String,
    pub consistent: bool,
    pub timestamp: f64,
}

/// A local ledger plus the peer handles it replicates with.
pub struct LedgerFederation {
    node_id: String,
    local: SharedLedger,
    peers: PeerSet,
    last_sync_hash: Option<String>,
}

impl LedgerFederation {
    /// Create a federation around a fresh local ledger.
    pub fn new(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            local: peer::shared_ledger(node_id),
            peers: PeerSet::new(),
            last_sync_hash: None,
        }
    }

    /// This node's id.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Handle to the local ledger, for registering with other
    /// federations or for direct reads.
    pub fn local_handle(&self) -> SharedLedger {
        Arc::clone(&self.local)
    }

    /// Number of registered peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Registered peer ids, sorted.
    pub fn peer_ids(&self) -> Vec<String> {
        self.peers.ids()
    }

    /// Hash of the last locally broadcast entry.
    pub fn last_sync_hash(&self) -> Option<&str> {
        self.last_sync_hash.as_deref()
    }

    /// Register a peer ledger handle. Idempotent; re-registering an id
    /// replaces the handle.
    pub fn register_peer(&mut self, peer_id: &str, ledger: SharedLedger) -> Result<(), FederationError> {
        if peer_id == self.node_id {
            return Err(FederationError::SelfPeer);
        }
        self.peers.insert(peer_id, ledger);
        Ok(())
    }

    /// Append an event to the local ledger, then fan it out to every
    /// peer as a `"<type>@<node_id>"` rebroadcast carrying the
    /// originating entry's hash in the signature slot. Peers that
    /// already hold the originating hash are skipped.
    pub fn broadcast_event(&mut self, event_type: &str, meta: Value) -> Result<LedgerEntry, FederationError> {
        let entry = peer::lock(&self.local).append_event(event_type, meta.clone())?;
        let origin_hash = entry.curr_hash.clone();
        let tagged = format!("{event_type}@{}", self.node_id);

        for (peer_id, handle) in self.peers.iter() {
            let mut peer_ledger = peer::lock(handle);
            if peer_ledger.chain().iter().any(|e| e.curr_hash == origin_hash) {
                debug!(peer = %peer_id, "rebroadcast skipped: hash already present");
                continue;
            }
            let result = peer_ledger.append_entry(
                &tagged,
                meta.clone(),
                Some(&self.node_id),
                Some(origin_hash.clone()),
            );
            if let Err(err) = result {
                warn!(peer = %peer_id, error = %err, "peer broadcast failed, skipping");
            }
        }

        self.last_sync_hash = Some(origin_hash);
        Ok(entry)
    }

    /// Pull unseen entries from every peer chain into the local chain.
    ///
    /// Inclusion rules, in order: skip known event ids and hashes, skip
    /// anything we originated or that rebroadcasts us, skip rebroadcasts
    /// whose `(origin, base_type)` is already represented locally, and
    /// otherwise adopt the entry after pruning any rebroadcast copies it
    /// supersedes. A merge that changed the chain re-orders it by
    /// `(timestamp, curr_hash)` so quiescent members converge on the
    /// same tail hash. Idempotent; safe to retry.
    pub fn merge_ledgers(&mut self) -> MergeReport {
        let mut added = 0usize;
        let mut pruned = 0usize;
        let local_tag = format!("@{}", self.node_id);

        for (peer_id, handle) in self.peers.iter() {
            let peer_chain: Vec<LedgerEntry> = peer::lock(handle).chain().to_vec();
            let mut local = peer::lock(&self.local);

            for entry in peer_chain {
                if local.chain().iter().any(|e| e.event_id == entry.event_id) {
                    continue;
                }
                if local.chain().iter().any(|e| e.curr_hash == entry.curr_hash) {
                    continue;
                }
                if entry.origin == self.node_id {
                    continue;
                }
                if entry.event_type.ends_with(&local_tag) {
                    continue;
                }

                let base = entry.base_type().to_string();
                if entry.is_rebroadcast() {
                    // The base event is authoritative once present
                    let represented = local
                        .chain()
                        .iter()
                        .any(|e| e.origin == entry.origin && e.base_type() == base);
                    if represented {
                        continue;
                    }
                } else {
                    let rebroadcast_prefix = format!("{base}@");
                    pruned += local.prune_where(|e| {
                        e.origin == entry.origin && e.event_type.starts_with(&rebroadcast_prefix)
                    });
                }

                local.adopt_entry(entry);
                added += 1;
            }

            debug!(peer = %peer_id, added, pruned, "merge pass complete");
        }

        let mut local = peer::lock(&self.local);
        if added > 0 || pruned > 0 {
            local.normalize_order();
        }
        local.reseat_last_hash();

        MergeReport {
            merged: added > 0 || pruned > 0,
            local_length: local.len(),
            peer_count: self.peers.len(),
        }
    }

    /// Collect every member's tip hash and fold them into a single
    /// federation root hash. `consistent` is true iff all tips agree.
    pub fn verify_federation_integrity(&self) -> IntegrityReport {
        let mut root_hashes: BTreeMap<String, Option<String>> = BTreeMap::new();
        root_hashes.insert(
            self.node_id.clone(),
            peer::lock(&self.local).last_hash().map(str::to_string),
        );
        for (peer_id, handle) in self.peers.iter() {
            root_hashes.insert(
                peer_id.clone(),
                peer::lock(handle).last_hash().map(str::to_string),
            );
        }

        let value = serde_json::to_value(&root_hashes).unwrap_or_default();
        let federation_hash = sha3_512_hex(canonical_string(&value).as_bytes());
        let unique_tips = root_hashes.values().collect::<HashSet<_>>().len();

        IntegrityReport {
            consistent: unique_tips == 1,
            root_hashes,
            federation_hash,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs_f64(),
        }
    }
}
