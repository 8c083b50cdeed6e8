//! Client cache synchronization settings.

use serde::{Deserialize, Serialize};

/// Bounds and pacing for the client cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum asset rows fetched per project refresh.
    #[serde(default = "default_asset_fetch_limit")]
    pub asset_fetch_limit: u32,
    /// Delay between consecutive bulk downloads, in milliseconds.
    #[serde(default = "default_download_interval")]
    pub download_interval_ms: u64,
    /// Extra pause after the last bulk download before the completion toast.
    #[serde(default = "default_download_settle")]
    pub download_settle_ms: u64,
    /// Buffer size of each change-feed channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            asset_fetch_limit: default_asset_fetch_limit(),
            download_interval_ms: default_download_interval(),
            download_settle_ms: default_download_settle(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_asset_fetch_limit() -> u32 {
    200
}

fn default_download_interval() -> u64 {
    300
}

fn default_download_settle() -> u64 {
    500
}

fn default_channel_buffer() -> usize {
    256
}
