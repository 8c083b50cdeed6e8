//! In-memory hosted store for single-node deployments and tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use assethub_core::config::FolderDeletePolicy;
use assethub_core::error::AppError;
use assethub_core::events::{ChangeEvent, ChangeKind, Table};
use assethub_core::result::AppResult;
use assethub_core::types::{AssetId, AssetQuery, FolderId, ProjectId, SortDirection};
use assethub_entity::{Asset, Folder, FolderTree, NewAsset, NewFolder, NewProject, Project};

use crate::feed::ChangeFeed;
use crate::traits::{ChangeStream, HostedStore};

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    folders: Vec<Folder>,
    /// Assets paired with their insertion sequence number.
    assets: Vec<(u64, Asset)>,
    next_seq: u64,
}

/// Hosted store backed by in-process tables.
///
/// Rows live in insertion order; listings sort a copy. Change events are
/// published after the table lock is released.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    feed: ChangeFeed,
    folder_policy: FolderDeletePolicy,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(folder_policy: FolderDeletePolicy, channel_buffer_size: usize) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            feed: ChangeFeed::new(channel_buffer_size),
            folder_policy,
            offline: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with a database error until turned
    /// back on. Subscriptions keep working.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::database("Store is unreachable"));
        }
        Ok(())
    }

    async fn publish_all(&self, events: Vec<ChangeEvent>) {
        for event in events {
            self.feed.publish(event).await;
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(FolderDeletePolicy::default(), 256)
    }
}

fn deleted(table: Table, id: impl Into<uuid::Uuid>) -> ChangeEvent {
    ChangeEvent::new(table, ChangeKind::Delete, Some(id.into()))
}

#[async_trait]
impl HostedStore for MemoryStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables.projects.iter().rev().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn insert_project(&self, data: &NewProject) -> AppResult<Project> {
        self.ensure_online()?;
        let project = Project {
            id: ProjectId::new(),
            name: data.name.clone(),
            description: data.description.clone(),
            color: data.color.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.projects.push(project.clone());
        debug!(project_id = %project.id, "Inserted project");

        self.feed
            .publish(ChangeEvent::new(
                Table::Projects,
                ChangeKind::Insert,
                Some(project.id.into()),
            ))
            .await;
        Ok(project)
    }

    async fn delete_project(&self, id: ProjectId) -> AppResult<()> {
        self.ensure_online()?;
        let mut events = Vec::new();
        {
            let mut tables = self.tables.write().await;
            let before = tables.projects.len();
            tables.projects.retain(|p| p.id != id);
            if tables.projects.len() == before {
                return Err(AppError::not_found(format!("Project {id} not found")));
            }
            events.push(deleted(Table::Projects, id));

            tables.folders.retain(|f| {
                let keep = f.project_id != id;
                if !keep {
                    events.push(deleted(Table::Folders, f.id));
                }
                keep
            });
            tables.assets.retain(|(_, a)| {
                let keep = a.project_id != Some(id);
                if !keep {
                    events.push(deleted(Table::Assets, a.id));
                }
                keep
            });
        }
        debug!(project_id = %id, rows = events.len(), "Deleted project");
        self.publish_all(events).await;
        Ok(())
    }

    async fn list_folders(&self, project_id: Option<ProjectId>) -> AppResult<Vec<Folder>> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        let mut folders: Vec<Folder> = tables
            .folders
            .iter()
            .filter(|f| project_id.is_none_or(|p| f.project_id == p))
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(folders)
    }

    async fn insert_folder(&self, data: &NewFolder) -> AppResult<Folder> {
        self.ensure_online()?;
        let folder = {
            let mut tables = self.tables.write().await;
            if !tables.projects.iter().any(|p| p.id == data.project_id) {
                return Err(AppError::not_found(format!(
                    "Project {} not found",
                    data.project_id
                )));
            }
            if let Some(parent_id) = data.parent_id {
                match tables.folders.iter().find(|f| f.id == parent_id) {
                    None => {
                        return Err(AppError::not_found(format!(
                            "Parent folder {parent_id} not found"
                        )));
                    }
                    Some(parent) if parent.project_id != data.project_id => {
                        return Err(AppError::conflict(
                            "Parent folder belongs to a different project",
                        ));
                    }
                    Some(_) => {}
                }
            }
            let folder = Folder {
                id: FolderId::new(),
                project_id: data.project_id,
                parent_id: data.parent_id,
                name: data.name.clone(),
                created_at: Utc::now(),
            };
            tables.folders.push(folder.clone());
            folder
        };

        self.feed
            .publish(ChangeEvent::new(
                Table::Folders,
                ChangeKind::Insert,
                Some(folder.id.into()),
            ))
            .await;
        Ok(folder)
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        self.ensure_online()?;
        let mut events = Vec::new();
        {
            let mut tables = self.tables.write().await;
            let doomed: HashSet<FolderId> = FolderTree::new(tables.folders.iter())
                .subtree(id)
                .into_iter()
                .collect();
            if doomed.is_empty() {
                return Err(AppError::not_found(format!("Folder {id} not found")));
            }

            tables.folders.retain(|f| {
                let keep = !doomed.contains(&f.id);
                if !keep {
                    events.push(deleted(Table::Folders, f.id));
                }
                keep
            });

            match self.folder_policy {
                FolderDeletePolicy::Cascade => tables.assets.retain(|(_, a)| {
                    let keep = !a.folder_id.is_some_and(|f| doomed.contains(&f));
                    if !keep {
                        events.push(deleted(Table::Assets, a.id));
                    }
                    keep
                }),
                FolderDeletePolicy::Detach => {
                    for (_, asset) in tables.assets.iter_mut() {
                        if asset.folder_id.is_some_and(|f| doomed.contains(&f)) {
                            asset.folder_id = None;
                            events.push(ChangeEvent::new(
                                Table::Assets,
                                ChangeKind::Update,
                                Some(asset.id.into()),
                            ));
                        }
                    }
                }
            }
        }
        debug!(folder_id = %id, rows = events.len(), policy = ?self.folder_policy, "Deleted folder");
        self.publish_all(events).await;
        Ok(())
    }

    async fn list_assets(&self, query: &AssetQuery) -> AppResult<Vec<Asset>> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<&(u64, Asset)> = tables
            .assets
            .iter()
            .filter(|(_, a)| query.project_id.is_none_or(|p| a.project_id == Some(p)))
            .filter(|(_, a)| query.folder.matches(a.folder_id))
            .filter(|(_, a)| query.name.as_ref().is_none_or(|n| &a.name == n))
            .collect();

        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            let ord = a.upload_date.cmp(&b.upload_date).then(seq_a.cmp(seq_b));
            match query.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(rows.into_iter().take(limit).map(|(_, a)| a.clone()).collect())
    }

    async fn insert_asset(&self, data: &NewAsset) -> AppResult<Asset> {
        self.ensure_online()?;
        let asset = {
            let mut tables = self.tables.write().await;
            if let Some(project_id) = data.project_id {
                if !tables.projects.iter().any(|p| p.id == project_id) {
                    return Err(AppError::not_found(format!(
                        "Project {project_id} not found"
                    )));
                }
            }
            if let Some(folder_id) = data.folder_id {
                let folder = tables
                    .folders
                    .iter()
                    .find(|f| f.id == folder_id)
                    .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
                if Some(folder.project_id) != data.project_id {
                    return Err(AppError::conflict(
                        "Folder belongs to a different project",
                    ));
                }
            }

            let asset = data.clone().into_asset();
            let seq = tables.next_seq;
            tables.next_seq += 1;
            tables.assets.push((seq, asset.clone()));
            asset
        };

        self.feed
            .publish(ChangeEvent::new(
                Table::Assets,
                ChangeKind::Insert,
                Some(asset.id.into()),
            ))
            .await;
        Ok(asset)
    }

    async fn delete_asset(&self, id: AssetId) -> AppResult<()> {
        self.ensure_online()?;
        {
            let mut tables = self.tables.write().await;
            let before = tables.assets.len();
            tables.assets.retain(|(_, a)| a.id != id);
            if tables.assets.len() == before {
                return Err(AppError::not_found(format!("Asset {id} not found")));
            }
        }
        self.feed.publish(deleted(Table::Assets, id)).await;
        Ok(())
    }

    async fn delete_assets(&self, ids: &[AssetId]) -> AppResult<u64> {
        self.ensure_online()?;
        let wanted: HashSet<AssetId> = ids.iter().copied().collect();
        let mut events = Vec::new();
        {
            let mut tables = self.tables.write().await;
            tables.assets.retain(|(_, a)| {
                let keep = !wanted.contains(&a.id);
                if !keep {
                    events.push(deleted(Table::Assets, a.id));
                }
                keep
            });
        }
        let removed = events.len() as u64;
        self.publish_all(events).await;
        Ok(removed)
    }

    async fn count_assets(&self, project_id: Option<ProjectId>) -> AppResult<u64> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .iter()
            .filter(|(_, a)| project_id.is_none_or(|p| a.project_id == Some(p)))
            .count() as u64)
    }

    async fn total_asset_bytes(&self) -> AppResult<u64> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .iter()
            .map(|(_, a)| a.size.max(0) as u64)
            .sum())
    }

    async fn subscribe(&self, table: Table) -> AppResult<ChangeStream> {
        Ok(self.feed.subscribe(table).await)
    }
}

#[cfg(test)]
mod tests {
    use assethub_core::types::FolderScope;

    use super::*;

    async fn seeded(policy: FolderDeletePolicy) -> (MemoryStore, Project, Folder, Folder) {
        let store = MemoryStore::new(policy, 64);
        let project = store
            .insert_project(&NewProject::new("Marketing", None, None))
            .await
            .unwrap();
        let logos = store
            .insert_folder(&NewFolder::new(project.id, None, "Logos"))
            .await
            .unwrap();
        let year = store
            .insert_folder(&NewFolder::new(project.id, Some(logos.id), "2024"))
            .await
            .unwrap();
        (store, project, logos, year)
    }

    fn png(project: &Project, folder: Option<&Folder>, name: &str) -> NewAsset {
        NewAsset::from_bytes(
            Some(project.id),
            folder.map(|f| f.id),
            name,
            "image/png",
            name.as_bytes(),
        )
    }

    #[tokio::test]
    async fn test_assets_listed_newest_first_with_limit() {
        let (store, project, _, _) = seeded(FolderDeletePolicy::Cascade).await;
        for name in ["a.png", "b.png", "c.png"] {
            store.insert_asset(&png(&project, None, name)).await.unwrap();
        }

        let listed = store
            .list_assets(&AssetQuery::for_project(project.id).limit(2))
            .await
            .unwrap();
        let names: Vec<_> = listed.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["c.png", "b.png"]);
    }

    #[tokio::test]
    async fn test_project_delete_leaves_no_orphans() {
        let (store, project, logos, year) = seeded(FolderDeletePolicy::Cascade).await;
        store.insert_asset(&png(&project, Some(&year), "x.png")).await.unwrap();
        store.insert_asset(&png(&project, Some(&logos), "y.png")).await.unwrap();
        store.insert_asset(&png(&project, None, "z.png")).await.unwrap();

        store.delete_project(project.id).await.unwrap();

        assert!(store.list_projects().await.unwrap().is_empty());
        assert!(store.list_folders(None).await.unwrap().is_empty());
        assert_eq!(store.count_assets(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_folder_delete_policies() {
        let (store, project, logos, year) = seeded(FolderDeletePolicy::Cascade).await;
        store.insert_asset(&png(&project, Some(&year), "x.png")).await.unwrap();
        store.insert_asset(&png(&project, None, "z.png")).await.unwrap();
        store.delete_folder(logos.id).await.unwrap();
        assert!(store.list_folders(Some(project.id)).await.unwrap().is_empty());
        assert_eq!(store.count_assets(Some(project.id)).await.unwrap(), 1);

        let (store, project, logos, year) = seeded(FolderDeletePolicy::Detach).await;
        store.insert_asset(&png(&project, Some(&year), "x.png")).await.unwrap();
        store.delete_folder(logos.id).await.unwrap();
        let unfiled = store
            .list_assets(&AssetQuery::for_project(project.id).in_folder(FolderScope::Unfiled))
            .await
            .unwrap();
        assert_eq!(unfiled.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_cross_project_nesting() {
        let (store, _, logos, _) = seeded(FolderDeletePolicy::Cascade).await;
        let other = store
            .insert_project(&NewProject::new("Other", None, None))
            .await
            .unwrap();
        let err = store
            .insert_folder(&NewFolder::new(other.id, Some(logos.id), "Stray"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, assethub_core::error::ErrorKind::Conflict);

        let err = store
            .insert_asset(&png(&other, Some(&logos), "stray.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, assethub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_batched_delete_publishes_per_row() {
        let (store, project, _, _) = seeded(FolderDeletePolicy::Cascade).await;
        let a = store.insert_asset(&png(&project, None, "a.png")).await.unwrap();
        let b = store.insert_asset(&png(&project, None, "b.png")).await.unwrap();
        let mut rx = store.subscribe(Table::Assets).await.unwrap();

        let removed = store.delete_assets(&[a.id, b.id, AssetId::new()]).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(rx.recv().await.unwrap().kind, ChangeKind::Delete);
        assert_eq!(rx.recv().await.unwrap().kind, ChangeKind::Delete);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_offline_store_fails_without_mutating() {
        let (store, project, _, _) = seeded(FolderDeletePolicy::Cascade).await;
        store.insert_asset(&png(&project, None, "a.png")).await.unwrap();
        store.set_offline(true);
        assert!(store.delete_project(project.id).await.is_err());
        store.set_offline(false);
        assert_eq!(store.count_assets(Some(project.id)).await.unwrap(), 1);
        assert_eq!(store.total_asset_bytes().await.unwrap(), 5);
    }
}
