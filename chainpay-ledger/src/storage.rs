//! Snapshot persistence
//!
//! The core keeps all state in memory; persistence is a bootstrap concern.
//! A [`SnapshotStore`] serializes the whole [`LedgerState`] with bincode and
//! writes it atomically (temp file in the same directory, then rename), so a
//! crash mid-write never leaves a torn snapshot behind.

use crate::{error::Result, ledger::LedgerState, Config, Error};
use std::path::PathBuf;

/// Bincode snapshot store for the ledger state
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store rooted at the configured snapshot path
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.snapshot_path(),
        }
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load the persisted state, `None` if no snapshot exists yet
    pub fn load(&self) -> Result<Option<LedgerState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        let state: LedgerState = bincode::deserialize(&bytes)?;
        Ok(Some(state))
    }

    /// Persist the state atomically
    pub fn save(&self, state: &LedgerState) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::Storage(format!("snapshot path has no parent: {:?}", self.path)))?;
        std::fs::create_dir_all(dir)?;

        let bytes = bincode::serialize(state)?;
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::fs::write(tmp.path(), &bytes)?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(path = ?self.path, bytes = bytes.len(), "snapshot saved");
        Ok(())
    }
}
