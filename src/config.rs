//! Configuration for prefkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default bound for blocking reads on the transactional store (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;

/// Default bound for blocking reads on the transactional store
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(DEFAULT_READ_TIMEOUT_MS);

/// Main configuration for a preference store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding snapshot files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {store_name}.prefs   (snapshot of every key)
    pub data_dir: PathBuf,

    /// Store identifier, used as the snapshot file stem
    pub store_name: String,

    /// fsync snapshot files before renaming them into place
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Read Configuration
    // -------------------------------------------------------------------------
    /// Bound on `AsyncPrefs::read_blocking` (milliseconds)
    pub read_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./prefkv_data"),
            store_name: "prefs".to_string(),
            sync_writes: true,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the snapshot file for this store
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.prefs", self.store_name))
    }

    /// Blocking-read bound as a `Duration`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the store identifier
    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.config.store_name = name.into();
        self
    }

    /// Enable or disable fsync of snapshot files
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the blocking-read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
