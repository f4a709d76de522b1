// GHX Continuity - hash-linked event ledger with federation and vault export
//
// Five subsystems, composed leaves-first:
// - canonical:  deterministic JSON bytes + SHA3 digests (every preimage)
// - ledger:     append-only, hash-linked, self-signed event chain
// - audit:      stateless snapshot verification and divergence diffing
// - vault:      rotating on-disk snapshot store, one container per ledger
// - federation: broadcast fan-out and merge reconciliation across peers

pub mod audit;
pub mod canonical;
pub mod federation;
pub mod ledger;
pub mod vault;

pub use audit::{DiffReport, LedgerAuditor};
pub use federation::{
    shared_ledger, FederationError, IntegrityReport, LedgerFederation, MergeReport, PeerSet,
    SharedLedger,
};
pub use ledger::{ContinuityLedger, LedgerEntry, LedgerError, Snapshot, VerifyFault, VerifyReport};
pub use vault::{ExportReceipt, VaultError, VaultExporter, DEFAULT_CONTAINER};
