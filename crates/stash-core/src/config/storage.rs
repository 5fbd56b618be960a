//! Blob storage and metadata store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of all tenant physical storage. Every blob handle and folder
    /// physical path is relative to this directory.
    #[serde(default = "default_upload_base_path")]
    pub upload_base_path: String,
    /// Maximum accepted upload size in bytes (default 100 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_base_path: default_upload_base_path(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

/// Settings applied to every metadata store round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound for a single store call, in milliseconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
}

impl StoreConfig {
    /// The per-call timeout as a [`Duration`].
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms.max(1))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: default_operation_timeout(),
        }
    }
}

fn default_upload_base_path() -> String {
    "./uploads".to_string()
}

fn default_max_upload() -> u64 {
    107_374_182_400 // 100 GB
}

fn default_operation_timeout() -> u64 {
    5_000
}
