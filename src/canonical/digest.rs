// SHA3 digest helpers - all hashes in the system are lowercase hex

use sha3::{Digest, Sha3_256, Sha3_512};

/// SHA3-512 digest as a lowercase hex string (chain hashes, vault content ids)
pub fn sha3_512_hex(data: &[u8]) -> String {
    let mut hasher = Sha3_512::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA3-256 digest as a lowercase hex string (entry signatures)
pub fn sha3_256_hex(data: &[u8]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
