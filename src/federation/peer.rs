// Peer Handles - shared, lockable references to peer ledgers
//
// The reference transport is in-process: a peer is a handle to the
// ledger another federation instance writes locally. Peer ledgers are
// read-and-append only; a federation never rewrites a peer's history.

use crate::ledger::ContinuityLedger;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A ledger handle that can be registered with multiple federations.
pub type SharedLedger = Arc<Mutex<ContinuityLedger>>;

/// Create a fresh shareable ledger for a node.
pub fn shared_ledger(node_id: &str) -> SharedLedger {
    Arc::new(Mutex::new(ContinuityLedger::new(node_id)))
}

/// Lock a shared ledger, recovering from a poisoned mutex. Every ledger
/// mutation completes before its guard drops, so a poisoned ledger still
/// holds consistent state.
pub(crate) fn lock(ledger: &SharedLedger) -> MutexGuard<'_, ContinuityLedger> {
    match ledger.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Registry of peer ledger handles, keyed by node id.
///
/// Backed by a BTreeMap so merge traversal order is deterministic.
#[derive(Clone, Default)]
pub struct PeerSet {
    peers: BTreeMap<String, SharedLedger>,
}

impl PeerSet {
    /// Create an empty peer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Number of registered peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check if a peer id is registered.
    pub fn contains(&self, peer_id: &str) -> bool {
        self.peers.contains_key(peer_id)
    }

    /// Register or replace a peer handle. Idempotent.
    pub fn insert(&mut self, peer_id: &str, ledger: SharedLedger) {
        self.peers.insert(peer_id.to_string(), ledger);
    }

    /// Registered peer ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.peers.keys().cloned().collect()
    }

    /// Iterate peers in sorted id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SharedLedger)> {
        self.peers.iter()
    }
}
