// Canonical JSON - sorted keys, compact separators, unicode preserved
//
// serde_json's default object map is ordered by key, so a compact dump of
// any Value is already the canonical byte form. Ledger and auditor must
// produce byte-identical preimages, so both route through this module.

use serde_json::Value;

/// Serialize a JSON value to its canonical compact form.
pub fn canonical_string(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Return a copy of an object value with the given keys removed.
/// Non-object values are returned unchanged.
pub fn strip_keys(value: &Value, keys: &[&str]) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = map.clone();
            for key in keys {
                out.remove(*key);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}
