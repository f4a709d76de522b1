// Ledger Entry - one immutable record in the continuity chain

use crate::canonical::{canonical_string, sha3_256_hex, sha3_512_hex, strip_keys};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single sealed event record.
///
/// `curr_hash` is computed over the canonical entry without `curr_hash`
/// and `signature` (neither exists yet when the entry is hashed).
/// `signature` is computed over the canonical entry without `signature`,
/// which by then includes `curr_hash`. Rebroadcast entries (event type
/// tagged `"<base>@<node>"`) instead carry the originating entry's
/// SHA3-512 hash in `signature` as an opaque correlator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub event_id: String,
    pub seq: u64,
    pub timestamp: f64,
    pub event_type: String,
    pub meta: Value,
    pub origin: String,
    pub prev_hash: Option<String>,
    pub curr_hash: String,
    pub signature: String,
}

impl LedgerEntry {
    /// Full JSON form of the entry, keys in canonical (sorted) order.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("event_id".into(), Value::String(self.event_id.clone()));
        map.insert("seq".into(), Value::from(self.seq));
        map.insert("timestamp".into(), Value::from(self.timestamp));
        map.insert("event_type".into(), Value::String(self.event_type.clone()));
        map.insert("meta".into(), self.meta.clone());
        map.insert("origin".into(), Value::String(self.origin.clone()));
        map.insert(
            "prev_hash".into(),
            match &self.prev_hash {
                Some(hash) => Value::String(hash.clone()),
                None => Value::Null,
            },
        );
        map.insert("curr_hash".into(), Value::String(self.curr_hash.clone()));
        map.insert("signature".into(), Value::String(self.signature.clone()));
        Value::Object(map)
    }

    /// Recompute the chain hash: SHA3-512 over the canonical entry
    /// without `curr_hash` and `signature`.
    pub fn compute_hash(&self) -> String {
        let preimage = strip_keys(&self.to_value(), &["curr_hash", "signature"]);
        sha3_512_hex(canonical_string(&preimage).as_bytes())
    }

    /// Recompute the node signature: SHA3-256 over
    /// `"<node_id>:<SHA3-512 of the canonical entry without signature>"`.
    pub fn compute_signature(&self, node_id: &str) -> String {
        let preimage = strip_keys(&self.to_value(), &["signature"]);
        let seal = sha3_512_hex(canonical_string(&preimage).as_bytes());
        sha3_256_hex(format!("{node_id}:{seal}").as_bytes())
    }

    /// True if this entry is a rebroadcast copy (`"<base>@<node>"`).
    pub fn is_rebroadcast(&self) -> bool {
        self.event_type.contains('@')
    }

    /// Event type with any `@<node>` rebroadcast suffix stripped.
    pub fn base_type(&self) -> &str {
        match self.event_type.rsplit_once('@') {
            Some((base, _)) => base,
            None => &self.event_type,
        }
    }
}

/// Generate a fresh globally-unique event id.
pub fn generate_event_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("evt_{}", hex::encode(bytes))
}
