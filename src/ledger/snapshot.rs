// Snapshot - the serialized, transportable form of a ledger
//
// Snapshots are the only representation that crosses process or
// persistence boundaries: vault files, auditor input, peer transfer.

use crate::ledger::entry::LedgerEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub node_id: String,
    pub length: usize,
    pub last_hash: Option<String>,
    pub chain: Vec<LedgerEntry>,
    pub verified: bool,
}

impl Snapshot {
    /// JSON form, keys in canonical order.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Parse a snapshot from raw JSON.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}
