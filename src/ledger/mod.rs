// Ledger module - THE CONTINUITY CHAIN
// Append-only, hash-linked, self-signed event history for one node

mod chain;
mod entry;
mod snapshot;
mod verify;

pub use chain::{ContinuityLedger, LedgerError};
pub use entry::{generate_event_id, LedgerEntry};
pub use snapshot::Snapshot;
pub use verify::{VerifyFault, VerifyReport};
