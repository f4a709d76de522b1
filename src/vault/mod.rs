// Vault module - durable snapshot storage with rotation
// One rotating container directory per ledger, plaintext JSON files

mod exporter;

pub use exporter::{ExportReceipt, VaultError, VaultExporter, DEFAULT_CONTAINER};
