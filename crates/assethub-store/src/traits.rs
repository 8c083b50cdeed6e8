//! Store traits implemented by every backend.

use async_trait::async_trait;
use tokio::sync::broadcast;

use assethub_core::events::{ChangeEvent, Table};
use assethub_core::result::AppResult;
use assethub_core::types::{AssetId, AssetQuery, FolderId, ProjectId};
use assethub_entity::{Asset, Folder, NewAsset, NewFolder, NewProject, Project};

/// Receiver side of a per-table change channel.
pub type ChangeStream = broadcast::Receiver<ChangeEvent>;

/// The hosted relational backend: projects, folders, and assets with push
/// notifications.
///
/// Deleting a project removes its folders and assets. Folder deletion
/// follows the store's configured policy. Every mutation publishes one
/// [`ChangeEvent`] per affected row on the matching table channel.
#[async_trait]
pub trait HostedStore: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name (e.g. "memory", "postgres").
    fn provider_type(&self) -> &str;

    /// All projects, newest first.
    async fn list_projects(&self) -> AppResult<Vec<Project>>;

    /// Insert a project and return the stored row.
    async fn insert_project(&self, data: &NewProject) -> AppResult<Project>;

    /// Delete a project with its folders and assets.
    async fn delete_project(&self, id: ProjectId) -> AppResult<()>;

    /// Folders, oldest first, optionally restricted to one project.
    async fn list_folders(&self, project_id: Option<ProjectId>) -> AppResult<Vec<Folder>>;

    /// Insert a folder. The parent, if any, must belong to the same project.
    async fn insert_folder(&self, data: &NewFolder) -> AppResult<Folder>;

    /// Delete a folder and its descendant folders.
    async fn delete_folder(&self, id: FolderId) -> AppResult<()>;

    /// Assets matching the query, ordered and bounded by it.
    async fn list_assets(&self, query: &AssetQuery) -> AppResult<Vec<Asset>>;

    /// Insert an asset and return the stored row.
    async fn insert_asset(&self, data: &NewAsset) -> AppResult<Asset>;

    /// Delete one asset.
    async fn delete_asset(&self, id: AssetId) -> AppResult<()>;

    /// Delete a set of assets in one request, returning how many went.
    async fn delete_assets(&self, ids: &[AssetId]) -> AppResult<u64>;

    /// Number of assets, optionally restricted to one project.
    async fn count_assets(&self, project_id: Option<ProjectId>) -> AppResult<u64>;

    /// Sum of the `size` column over every asset.
    async fn total_asset_bytes(&self) -> AppResult<u64>;

    /// Subscribe to any-row changes of one table.
    async fn subscribe(&self, table: Table) -> AppResult<ChangeStream>;
}

/// A string key-value store holding whole serialized collections.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read the value under `key`, if any.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Replace the value under `key`.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}
