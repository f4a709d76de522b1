// Vault Exporter - rotating, content-addressed ledger snapshots on disk
//
// Layout: <root>/<container_id>/<UTC-YYYYMMDD_HHMMSS>_<hash[:12]>.json
// Filenames sort newest-first lexicographically because the timestamp is
// the prefix. Rotation keeps only the newest `max_keep` files per
// container. Single writer per container directory.

use crate::canonical::{canonical_string, sha3_512_hex};
use crate::ledger::{ContinuityLedger, Snapshot};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default container id for continuity ledger snapshots.
pub const DEFAULT_CONTAINER: &str = "gcl";

const DEFAULT_MAX_KEEP: usize = 5;

/// Errors from vault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Cannot export a snapshot of an empty ledger")]
    EmptyLedger,

    #[error("No snapshots found for container '{0}'")]
    NoSnapshots(String),

    #[error("Vault I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Receipt returned by a successful export.
#[derive(Clone, Debug, Serialize)]
pub struct ExportReceipt {
    pub container: String,
    pub path: PathBuf,
    pub hash: String,
    pub timestamp: String,
    pub entries: usize,
}

/// Directory-backed rotating snapshot store.
pub struct VaultExporter {
    root: PathBuf,
    max_keep: usize,
}

impl VaultExporter {
    /// Create an exporter rooted at a directory, keeping the default
    /// number of snapshots per container.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            max_keep: DEFAULT_MAX_KEEP,
        }
    }

    /// Set the per-container retention bound.
    pub fn with_max_keep(mut self, max_keep: usize) -> Self {
        self.max_keep = max_keep;
        self
    }

    /// Vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Retention bound per container.
    pub fn max_keep(&self) -> usize {
        self.max_keep
    }

    /// Snapshot a ledger into a container directory and rotate out stale
    /// files. The filename embeds the UTC timestamp and the first 12 hex
    /// of the snapshot's SHA3-512 content hash.
    pub fn export_snapshot(
        &self,
        ledger: &ContinuityLedger,
        container_id: &str,
    ) -> Result<ExportReceipt, VaultError> {
        if ledger.is_empty() {
            return Err(VaultError::EmptyLedger);
        }

        let snapshot = ledger.snapshot();
        let value = snapshot.to_value();
        let snap_hash = sha3_512_hex(canonical_string(&value).as_bytes());

        let dir = self.root.join(container_id);
        fs::create_dir_all(&dir)?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let filename = format!("{stamp}_{}.json", &snap_hash[..12]);
        let path = dir.join(&filename);
        fs::write(&path, serde_json::to_string_pretty(&value)?)?;
        debug!(container = %container_id, file = %filename, "exported snapshot");

        self.rotate(&dir)?;

        Ok(ExportReceipt {
            container: container_id.to_string(),
            path,
            hash: snap_hash,
            timestamp: stamp,
            entries: snapshot.length,
        })
    }

    /// Retained snapshot filenames for a container, newest first.
    pub fn list_snapshots(&self, container_id: &str) -> Result<Vec<String>, VaultError> {
        let dir = self.root.join(container_id);
        if !dir.is_dir() {
            return Err(VaultError::NoSnapshots(container_id.to_string()));
        }
        let mut names = snapshot_names(&dir)?;
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Rehydrate a fresh ledger from the newest snapshot in a container.
    /// Does not re-verify; callers typically pipe the result to the
    /// auditor.
    pub fn load_latest(&self, container_id: &str) -> Result<ContinuityLedger, VaultError> {
        let names = self.list_snapshots(container_id)?;
        let newest = names
            .first()
            .ok_or_else(|| VaultError::NoSnapshots(container_id.to_string()))?;

        let raw = fs::read_to_string(self.root.join(container_id).join(newest))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;

        let mut ledger = ContinuityLedger::new(&snapshot.node_id);
        ledger.restore(snapshot);
        Ok(ledger)
    }

    /// Delete everything beyond the newest `max_keep` files.
    fn rotate(&self, dir: &Path) -> Result<(), VaultError> {
        let mut names = snapshot_names(dir)?;
        names.sort_by(|a, b| b.cmp(a));

        for stale in names.iter().skip(self.max_keep) {
            debug!(file = %stale, "rotating out stale snapshot");
            fs::remove_file(dir.join(stale))?;
        }
        Ok(())
    }
}

fn snapshot_names(dir: &Path) -> Result<Vec<String>, VaultError> {
    let mut names = Vec::new();
    for item in fs::read_dir(dir)? {
        let item = item?;
        let name = item.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            names.push(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_export_empty_ledger_fails() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = VaultExporter::new(temp_dir.path());
        let ledger = ContinuityLedger::new("NA");

        let result = exporter.export_snapshot(&ledger, DEFAULT_CONTAINER);
        assert!(matches!(result, Err(VaultError::EmptyLedger)));
    }

    #[test]
    fn test_export_and_load_latest() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = VaultExporter::new(temp_dir.path());

        let mut ledger = ContinuityLedger::new("NA");
        ledger.append_event("startup", json!({"ok": true})).unwrap();

        let receipt = exporter.export_snapshot(&ledger, DEFAULT_CONTAINER).unwrap();
        assert_eq!(receipt.entries, 1);
        assert!(receipt.path.is_file());
        assert_eq!(receipt.hash.len(), 128);

        let restored = exporter.load_latest(DEFAULT_CONTAINER).unwrap();
        assert_eq!(restored.node_id(), "NA");
        assert_eq!(restored.last_hash(), ledger.last_hash());
    }

    #[test]
    fn test_load_latest_missing_container() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = VaultExporter::new(temp_dir.path());

        let result = exporter.load_latest("absent");
        assert!(matches!(result, Err(VaultError::NoSnapshots(_))));
    }
}
