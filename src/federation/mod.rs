// Federation module - HOW NODES RECONCILE
// Broadcast fan-out, merge reconciliation, and cross-node root hashing

mod engine;
mod peer;

pub use engine::{FederationError, IntegrityReport, LedgerFederation, MergeReport};
pub use peer::{shared_ledger, PeerSet, SharedLedger};
