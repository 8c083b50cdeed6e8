//! Library state and its reducer.

use std::collections::{HashMap, HashSet};

use assethub_core::events::Table;
use assethub_core::types::{AssetId, FolderId, ProjectId};
use assethub_entity::{Asset, Folder, FolderTree, Project};

use super::filter::{self, FilterContext, FolderFilter, GridStatus};
use super::selection::Selection;

/// Which screen the library is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Project(ProjectId),
}

/// Fetch state of one cached collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Fetching,
    Error(String),
}

/// Fetch state of every cached collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSync {
    pub projects: SyncState,
    pub folders: SyncState,
    pub assets: SyncState,
}

impl CollectionSync {
    pub fn get(&self, table: Table) -> &SyncState {
        match table {
            Table::Projects => &self.projects,
            Table::Folders => &self.folders,
            Table::Assets => &self.assets,
        }
    }

    fn set(&mut self, table: Table, state: SyncState) {
        match table {
            Table::Projects => self.projects = state,
            Table::Folders => self.folders = state,
            Table::Assets => self.assets = state,
        }
    }
}

/// The client's mirror of the store plus navigation and selection.
///
/// Cached rows are never authoritative: every collection is replaced
/// wholesale when it is refetched.
#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    pub projects: Vec<Project>,
    pub folders: Vec<Folder>,
    /// Cached assets of every project fetched so far, in store order.
    pub assets: Vec<Asset>,
    pub asset_counts: HashMap<ProjectId, u64>,
    pub storage_bytes: u64,
    pub view: View,
    pub folder: FolderFilter,
    pub parent: Option<FolderId>,
    /// Normalized search query.
    pub search: String,
    pub selection: Selection,
    pub sync: CollectionSync,
}

/// Everything that can change [`LibraryState`].
#[derive(Debug, Clone)]
pub enum Action {
    ShowDashboard,
    OpenProject(ProjectId),
    SelectFolder(FolderFilter),
    DrillInto(FolderId),
    NavigateUp,
    Search(String),
    ToggleSelectionMode,
    ExitSelectionMode,
    ToggleAsset(AssetId),
    SelectAllVisible,
    DeselectAll,
    FetchStarted(Table),
    FetchFailed { table: Table, message: String },
    /// A fetch finished but its result no longer applies.
    FetchDiscarded(Table),
    ProjectsLoaded(Vec<Project>),
    FoldersLoaded(Vec<Folder>),
    /// A bounded asset fetch for one project. `complete` is set when the
    /// fetch returned fewer rows than the cap, so the row count is exact.
    ProjectAssetsLoaded {
        project_id: ProjectId,
        assets: Vec<Asset>,
        complete: bool,
    },
    CountsLoaded(HashMap<ProjectId, u64>),
    StorageMeasured(u64),
    ProjectRemoved(ProjectId),
}

impl LibraryState {
    pub fn active_project_id(&self) -> Option<ProjectId> {
        match self.view {
            View::Project(id) => Some(id),
            View::Dashboard => None,
        }
    }

    pub fn active_project(&self) -> Option<&Project> {
        let id = self.active_project_id()?;
        self.project(id)
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn folder_tree(&self) -> FolderTree {
        FolderTree::new(&self.folders)
    }

    /// Cached assets of one project.
    pub fn project_assets(&self, id: ProjectId) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(move |a| a.project_id == Some(id))
    }

    /// Cached assets inside a folder or any folder nested below it.
    pub fn subtree_assets(&self, id: FolderId) -> Vec<&Asset> {
        let subtree: HashSet<FolderId> = self.folder_tree().subtree(id).into_iter().collect();
        self.assets
            .iter()
            .filter(|a| a.folder_id.is_some_and(|f| subtree.contains(&f)))
            .collect()
    }

    /// Assets the grid shows right now, in display order.
    pub fn visible_assets(&self) -> Vec<&Asset> {
        let Some(project_id) = self.active_project_id() else {
            return Vec::new();
        };
        let tree = self.folder_tree();
        let ctx = FilterContext {
            project_id: Some(project_id),
            folder: self.folder,
            parent: self.parent,
            query: &self.search,
            folders: &tree,
        };
        filter::visible_assets(&self.assets, &ctx)
    }

    pub fn grid_status(&self) -> GridStatus {
        GridStatus::from_visible(self.visible_assets().len(), &self.search)
    }

    /// Selected assets in cache order.
    pub fn selected_assets(&self) -> Vec<&Asset> {
        self.assets
            .iter()
            .filter(|a| self.selection.contains(a.id))
            .collect()
    }

    fn reset_navigation(&mut self) {
        self.folder = FolderFilter::All;
        self.parent = None;
        self.search.clear();
        self.selection.exit();
    }

    fn owns_folder(&self, id: FolderId) -> bool {
        self.active_project_id()
            .is_some_and(|project| self.folder(id).is_some_and(|f| f.project_id == project))
    }
}

/// Apply one action to the state.
pub fn reduce(mut state: LibraryState, action: Action) -> LibraryState {
    match action {
        Action::ShowDashboard => {
            state.view = View::Dashboard;
            state.reset_navigation();
        }
        Action::OpenProject(id) => {
            if state.project(id).is_some() {
                state.view = View::Project(id);
                state.reset_navigation();
            }
        }
        Action::SelectFolder(filter) => {
            let allowed = match filter {
                FolderFilter::All => state.active_project_id().is_some(),
                FolderFilter::Folder(id) => state.owns_folder(id),
            };
            if allowed {
                state.folder = filter;
            }
        }
        Action::DrillInto(id) => {
            if state.owns_folder(id) {
                state.parent = Some(id);
                state.folder = FolderFilter::All;
            }
        }
        Action::NavigateUp => {
            if let Some(current) = state.parent {
                state.parent = state.folder(current).and_then(|f| f.parent_id);
                state.folder = FolderFilter::All;
            }
        }
        Action::Search(raw) => state.search = filter::normalize_query(&raw),
        Action::ToggleSelectionMode => state.selection.toggle_mode(),
        Action::ExitSelectionMode => state.selection.exit(),
        Action::ToggleAsset(id) => {
            state.selection.toggle(id);
        }
        Action::SelectAllVisible => {
            let ids: Vec<AssetId> = state.visible_assets().iter().map(|a| a.id).collect();
            state.selection.select_all(ids);
        }
        Action::DeselectAll => state.selection.clear(),
        Action::FetchStarted(table) => state.sync.set(table, SyncState::Fetching),
        Action::FetchFailed { table, message } => state.sync.set(table, SyncState::Error(message)),
        Action::FetchDiscarded(table) => {
            if state.sync.get(table) == &SyncState::Fetching {
                state.sync.set(table, SyncState::Idle);
            }
        }
        Action::ProjectsLoaded(projects) => {
            state.projects = projects;
            state.sync.projects = SyncState::Idle;
            let LibraryState {
                projects,
                asset_counts,
                ..
            } = &mut state;
            asset_counts.retain(|id, _| projects.iter().any(|p| p.id == *id));
            if let View::Project(id) = state.view {
                if state.project(id).is_none() {
                    state.view = View::Dashboard;
                    state.reset_navigation();
                }
            }
        }
        Action::FoldersLoaded(folders) => {
            state.folders = folders;
            state.sync.folders = SyncState::Idle;
            if let Some(parent) = state.parent {
                if state.folder(parent).is_none() {
                    state.parent = None;
                    state.folder = FolderFilter::All;
                }
            }
            if let FolderFilter::Folder(id) = state.folder {
                if state.folder(id).is_none() {
                    state.folder = FolderFilter::All;
                }
            }
        }
        Action::ProjectAssetsLoaded {
            project_id,
            assets,
            complete,
        } => {
            state.assets.retain(|a| a.project_id != Some(project_id));
            if complete {
                state.asset_counts.insert(project_id, assets.len() as u64);
            }
            state.assets.extend(assets);
            state.sync.assets = SyncState::Idle;
            prune_selection(&mut state);
        }
        Action::CountsLoaded(counts) => state.asset_counts = counts,
        Action::StorageMeasured(bytes) => state.storage_bytes = bytes,
        Action::ProjectRemoved(id) => {
            state.projects.retain(|p| p.id != id);
            state.folders.retain(|f| f.project_id != id);
            state.assets.retain(|a| a.project_id != Some(id));
            state.asset_counts.remove(&id);
            if state.view == View::Project(id) {
                state.view = View::Dashboard;
                state.reset_navigation();
            }
            prune_selection(&mut state);
        }
    }
    state
}

fn prune_selection(state: &mut LibraryState) {
    let LibraryState {
        assets, selection, ..
    } = state;
    selection.retain(|id| assets.iter().any(|a| a.id == *id));
}
