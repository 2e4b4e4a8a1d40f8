//! Configuration for the ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for snapshots
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Snapshot configuration
    pub snapshot: SnapshotConfig,

    /// Identifier registry configuration
    pub registry: RegistryConfig,

    /// Channel capacities for the actor runtime
    pub channels: ChannelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/ledger"),
            service_name: "chainpay-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            snapshot: SnapshotConfig::default(),
            registry: RegistryConfig::default(),
            channels: ChannelConfig::default(),
        }
    }
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Load an existing snapshot at open
    pub enabled: bool,

    /// Snapshot file name inside `data_dir`
    pub file_name: String,

    /// Persist a snapshot when the actor shuts down
    pub save_on_shutdown: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_name: "ledger.snapshot".to_string(),
            save_on_shutdown: true,
        }
    }
}

/// Identifier registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Collision-retry budget for hash-derived account ids
    pub max_id_retries: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_id_retries: 64 }
    }
}

/// Channel capacities for the actor runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Actor mailbox capacity (bounded for backpressure)
    pub mailbox_capacity: usize,

    /// Event broadcast capacity
    pub event_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
            event_capacity: 1024,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(retries) = std::env::var("LEDGER_MAX_ID_RETRIES") {
            config.registry.max_id_retries = retries
                .parse()
                .map_err(|e| crate::Error::Config(format!("LEDGER_MAX_ID_RETRIES: {}", e)))?;
        }

        if let Ok(save) = std::env::var("LEDGER_SNAPSHOT_ON_SHUTDOWN") {
            config.snapshot.save_on_shutdown = save == "1" || save.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }

    /// Full path of the snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot.file_name)
    }
}
