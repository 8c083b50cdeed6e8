//! Hosted store selection and policies.

use serde::{Deserialize, Serialize};

/// Which hosted store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// In-process tables, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL with LISTEN/NOTIFY change feed.
    Postgres,
}

/// What happens to the contents of a deleted folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderDeletePolicy {
    /// Remove descendant folders and every asset inside them.
    #[default]
    Cascade,
    /// Remove descendant folders and move their assets out of any folder.
    Detach,
}

/// Hosted store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend in use.
    #[serde(default)]
    pub provider: StoreProvider,
    /// Folder deletion policy.
    #[serde(default)]
    pub folder_delete: FolderDeletePolicy,
}
