//! Single-blob local library settings.

use serde::{Deserialize, Serialize};

/// Settings for the local variant, which keeps every asset in one
/// serialized blob under a fixed key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Key the asset collection is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory backing the file blob store.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Estimated quota of the blob store, in bytes.
    #[serde(default = "default_quota")]
    pub estimated_quota_bytes: u64,
    /// Fraction of the quota at which usage is shown as a warning.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    /// Fraction of the quota above which uploads are refused.
    #[serde(default = "default_write_headroom")]
    pub write_headroom: f64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            data_dir: default_data_dir(),
            estimated_quota_bytes: default_quota(),
            warning_threshold: default_warning_threshold(),
            write_headroom: default_write_headroom(),
        }
    }
}

fn default_storage_key() -> String {
    "assetLibrary".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_quota() -> u64 {
    5 * 1024 * 1024
}

fn default_warning_threshold() -> f64 {
    0.8
}

fn default_write_headroom() -> f64 {
    0.95
}
