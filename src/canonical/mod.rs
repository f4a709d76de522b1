// Canonical module - deterministic JSON bytes and SHA3 digests
// Every hash and signature preimage in the system goes through here

mod digest;
mod json;

pub use digest::{sha3_256_hex, sha3_512_hex};
pub use json::{canonical_string, strip_keys};
