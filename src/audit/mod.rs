// Audit module - stateless verification and comparison of snapshots
// Never mutates state; all outcomes are structured results

mod auditor;

pub use auditor::{DiffReport, LedgerAuditor};
