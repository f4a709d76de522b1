// Verification reports - verification is a query, not an exception

use serde::{Deserialize, Serialize};

/// What broke, if anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFault {
    /// Recomputed chain hash does not match the stored `curr_hash`
    HashMismatch,
    /// `prev_hash` does not match the previous entry's `curr_hash`
    LinkBroken,
    /// Recomputed signature does not match the stored `signature`
    BadSignature,
    /// Snapshot has no `chain` array
    MissingChain,
}

/// Outcome of a chain or snapshot verification walk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub verified: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VerifyFault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl VerifyReport {
    /// A clean walk over `count` entries.
    pub fn ok(count: usize) -> Self {
        Self {
            verified: true,
            count,
            error: None,
            index: None,
        }
    }

    /// A fault at a specific entry index.
    pub fn fault_at(fault: VerifyFault, index: usize, count: usize) -> Self {
        Self {
            verified: false,
            count,
            error: Some(fault),
            index: Some(index),
        }
    }

    /// A structural fault with no entry index (e.g. missing chain).
    pub fn fault(fault: VerifyFault) -> Self {
        Self {
            verified: false,
            count: 0,
            error: Some(fault),
            index: None,
        }
    }
}
