//! The hosted library controller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationErrors};

use assethub_core::config::{SyncConfig, UploadConfig};
use assethub_core::error::AppError;
use assethub_core::events::Table;
use assethub_core::result::AppResult;
use assethub_core::types::{AssetId, AssetQuery, FolderId, FolderScope, ProjectId};
use assethub_entity::{Asset, Folder, NewAsset, NewFolder, NewProject, Project};
use assethub_store::HostedStore;

use crate::download::{self, DownloadSink};
use crate::library::{Action, FolderFilter, LibraryState, reduce};
use crate::notify::{Confirm, Notifier, Toast};
use crate::upload::{CandidateFile, UploadReport, UploadRules};

/// Where an upload batch goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadTarget {
    pub project_id: Option<ProjectId>,
    pub folder_id: Option<FolderId>,
}

impl UploadTarget {
    pub fn project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            folder_id: None,
        }
    }

    pub fn folder(project_id: ProjectId, folder_id: FolderId) -> Self {
        Self {
            project_id: Some(project_id),
            folder_id: Some(folder_id),
        }
    }
}

/// Client for the hosted library.
///
/// Owns the [`LibraryState`] and publishes every new state on a watch
/// channel. Store calls never run while the state is borrowed, and each
/// completion re-checks the open project before touching the cache. Store
/// failures are logged, shown as error toasts, and leave the cache as it
/// was.
#[derive(Debug)]
pub struct HostedLibrary {
    store: Arc<dyn HostedStore>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    sink: Arc<dyn DownloadSink>,
    rules: UploadRules,
    sync: SyncConfig,
    state: watch::Sender<LibraryState>,
}

impl HostedLibrary {
    pub fn new(
        store: Arc<dyn HostedStore>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
        sink: Arc<dyn DownloadSink>,
        upload: &UploadConfig,
        sync: SyncConfig,
    ) -> Self {
        let (state, _) = watch::channel(LibraryState::default());
        Self {
            store,
            notifier,
            confirm,
            sink,
            rules: UploadRules::new(upload),
            sync,
            state,
        }
    }

    pub fn store(&self) -> &Arc<dyn HostedStore> {
        &self.store
    }

    /// Receive every state the library moves through.
    pub fn subscribe(&self) -> watch::Receiver<LibraryState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LibraryState {
        self.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&LibraryState) -> R) -> R {
        f(&*self.state.borrow())
    }

    pub fn dispatch(&self, action: Action) {
        self.state
            .send_modify(|state| *state = reduce(std::mem::take(state), action));
    }

    pub fn active_project_id(&self) -> Option<ProjectId> {
        self.with_state(LibraryState::active_project_id)
    }

    // ── Loading ─────────────────────────────────────────────────────────

    /// Load projects, folders, and aggregates for the dashboard.
    pub async fn init(&self) -> AppResult<()> {
        let projects = self.refresh_projects().await;
        let folders = self.refresh_folders().await;
        self.refresh_counts().await;
        projects.and(folders)
    }

    pub async fn refresh_projects(&self) -> AppResult<()> {
        self.dispatch(Action::FetchStarted(Table::Projects));
        match self.store.list_projects().await {
            Ok(projects) => {
                debug!(count = projects.len(), "Projects refetched");
                self.dispatch(Action::ProjectsLoaded(projects));
                Ok(())
            }
            Err(e) => Err(self.fetch_failed(Table::Projects, "Error loading projects from database", e)),
        }
    }

    pub async fn refresh_folders(&self) -> AppResult<()> {
        self.dispatch(Action::FetchStarted(Table::Folders));
        match self.store.list_folders(None).await {
            Ok(folders) => {
                debug!(count = folders.len(), "Folders refetched");
                self.dispatch(Action::FoldersLoaded(folders));
                Ok(())
            }
            Err(e) => Err(self.fetch_failed(Table::Folders, "Error loading folders from database", e)),
        }
    }

    /// Refetch the open project's newest assets, up to the fetch cap.
    ///
    /// Does nothing on the dashboard. A result that arrives after the user
    /// has moved to another project is discarded.
    pub async fn refresh_assets(&self) -> AppResult<()> {
        let Some(project_id) = self.active_project_id() else {
            return Ok(());
        };
        self.dispatch(Action::FetchStarted(Table::Assets));

        let limit = self.sync.asset_fetch_limit;
        let result = self
            .store
            .list_assets(&AssetQuery::for_project(project_id).limit(limit))
            .await;

        if self.active_project_id() != Some(project_id) {
            debug!(project_id = %project_id, "Discarding asset fetch for a project that is no longer open");
            // A fetch for the project now open owns the flag.
            if self.active_project_id().is_none() {
                self.dispatch(Action::FetchDiscarded(Table::Assets));
            }
            return Ok(());
        }

        match result {
            Ok(assets) => {
                debug!(project_id = %project_id, count = assets.len(), "Assets refetched");
                let complete = assets.len() < limit as usize;
                self.dispatch(Action::ProjectAssetsLoaded {
                    project_id,
                    assets,
                    complete,
                });
                Ok(())
            }
            Err(e) => Err(self.fetch_failed(Table::Assets, "Error loading assets from database", e)),
        }
    }

    /// Recompute per-project counts and total storage.
    ///
    /// Failures are only logged; the previous aggregates stay.
    pub async fn refresh_counts(&self) {
        let ids: Vec<ProjectId> = self.with_state(|s| s.projects.iter().map(|p| p.id).collect());
        let counts = try_join_all(ids.into_iter().map(|id| async move {
            self.store.count_assets(Some(id)).await.map(|count| (id, count))
        }))
        .await;

        match counts {
            Ok(counts) => self.dispatch(Action::CountsLoaded(counts.into_iter().collect::<HashMap<_, _>>())),
            Err(e) => warn!(error = %e, "Failed to load asset counts"),
        }

        match self.store.total_asset_bytes().await {
            Ok(bytes) => self.dispatch(Action::StorageMeasured(bytes)),
            Err(e) => warn!(error = %e, "Failed to measure storage"),
        }
    }

    /// Refetch whatever a change to `table` affects.
    pub async fn apply_change(&self, table: Table) {
        match table {
            Table::Projects => {
                let _ = self.refresh_projects().await;
                self.refresh_counts().await;
            }
            Table::Folders => {
                let _ = self.refresh_folders().await;
            }
            Table::Assets => {
                if self.active_project_id().is_some() {
                    let _ = self.refresh_assets().await;
                }
                self.refresh_counts().await;
            }
        }
    }

    fn fetch_failed(&self, table: Table, message: &str, e: AppError) -> AppError {
        error!(table = %table, error = %e, "Refetch failed");
        self.dispatch(Action::FetchFailed {
            table,
            message: e.message.clone(),
        });
        self.notifier.notify(Toast::error(message));
        e
    }

    // ── Navigation ──────────────────────────────────────────────────────

    pub fn show_dashboard(&self) {
        self.dispatch(Action::ShowDashboard);
    }

    /// Open a project and fetch its assets.
    pub async fn open_project(&self, id: ProjectId) -> AppResult<()> {
        self.dispatch(Action::OpenProject(id));
        if self.active_project_id() != Some(id) {
            return Err(AppError::not_found(format!("Project {id} not found")));
        }
        self.refresh_assets().await
    }

    pub fn select_folder(&self, filter: FolderFilter) {
        self.dispatch(Action::SelectFolder(filter));
    }

    pub fn drill_into(&self, id: FolderId) {
        self.dispatch(Action::DrillInto(id));
    }

    pub fn navigate_up(&self) {
        self.dispatch(Action::NavigateUp);
    }

    pub fn search(&self, raw: &str) {
        self.dispatch(Action::Search(raw.to_string()));
    }

    pub fn toggle_selection_mode(&self) {
        self.dispatch(Action::ToggleSelectionMode);
    }

    pub fn toggle_asset(&self, id: AssetId) {
        self.dispatch(Action::ToggleAsset(id));
    }

    pub fn select_all(&self) {
        self.dispatch(Action::SelectAllVisible);
    }

    pub fn deselect_all(&self) {
        self.dispatch(Action::DeselectAll);
    }

    // ── Projects ────────────────────────────────────────────────────────

    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> AppResult<Project> {
        let data = NewProject::new(name, description, color);
        if let Err(errors) = data.validate() {
            return Err(self.invalid(&errors, "Please enter a project name"));
        }

        match self.store.insert_project(&data).await {
            Ok(project) => {
                info!(project_id = %project.id, name = %project.name, "Project created");
                self.notifier
                    .notify(Toast::success(format!("Project \"{}\" created", project.name)));
                let _ = self.refresh_projects().await;
                self.refresh_counts().await;
                Ok(project)
            }
            Err(e) => {
                error!(error = %e, "Failed to create project");
                self.notifier.notify(Toast::error("Error creating project"));
                Err(e)
            }
        }
    }

    /// Delete a project with everything in it, after confirmation.
    pub async fn delete_project(&self, id: ProjectId) -> AppResult<bool> {
        let (name, count) = self
            .with_state(|s| {
                s.project(id).map(|p| {
                    let cached = s.project_assets(id).count() as u64;
                    (p.name.clone(), s.asset_counts.get(&id).copied().unwrap_or(cached))
                })
            })
            .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))?;

        let prompt = if count > 0 {
            format!("Delete project \"{name}\" and all {count} asset(s) inside it?")
        } else {
            format!("Delete project \"{name}\"?")
        };
        if !self.confirm.confirm(&prompt).await {
            return Ok(false);
        }

        match self.store.delete_project(id).await {
            Ok(()) => {
                info!(project_id = %id, "Project deleted");
                self.notifier.notify(Toast::success("Project deleted"));
                self.dispatch(Action::ProjectRemoved(id));
                let _ = self.refresh_projects().await;
                let _ = self.refresh_folders().await;
                self.refresh_counts().await;
                Ok(true)
            }
            Err(e) => {
                error!(project_id = %id, error = %e, "Failed to delete project");
                self.notifier.notify(Toast::error("Error deleting project"));
                Err(e)
            }
        }
    }

    // ── Folders ─────────────────────────────────────────────────────────

    /// Create a folder at the current navigation level of the open project.
    pub async fn create_folder(&self, name: &str) -> AppResult<Folder> {
        let Some((project_id, parent)) =
            self.with_state(|s| s.active_project_id().map(|id| (id, s.parent)))
        else {
            let message = "Please select a project first";
            self.notifier.notify(Toast::error(message));
            return Err(AppError::validation(message));
        };

        let data = NewFolder::new(project_id, parent, name);
        if let Err(errors) = data.validate() {
            return Err(self.invalid(&errors, "Please enter a folder name"));
        }

        match self.store.insert_folder(&data).await {
            Ok(folder) => {
                info!(folder_id = %folder.id, name = %folder.name, "Folder created");
                self.notifier
                    .notify(Toast::success(format!("Folder \"{}\" created", folder.name)));
                let _ = self.refresh_folders().await;
                Ok(folder)
            }
            Err(e) => {
                error!(error = %e, "Failed to create folder");
                self.notifier.notify(Toast::error("Error creating folder"));
                Err(e)
            }
        }
    }

    /// Delete a folder after confirmation and return to "All".
    pub async fn delete_folder(&self, id: FolderId) -> AppResult<bool> {
        let (name, count) = self
            .with_state(|s| s.folder(id).map(|f| (f.name.clone(), s.subtree_assets(id).len())))
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        let prompt = if count > 0 {
            format!("Delete folder \"{name}\" and {count} asset(s) inside it?")
        } else {
            format!("Delete folder \"{name}\"?")
        };
        if !self.confirm.confirm(&prompt).await {
            return Ok(false);
        }

        match self.store.delete_folder(id).await {
            Ok(()) => {
                info!(folder_id = %id, "Folder deleted");
                self.notifier.notify(Toast::success("Folder deleted"));
                self.dispatch(Action::SelectFolder(FolderFilter::All));
                let _ = self.refresh_folders().await;
                let _ = self.refresh_assets().await;
                self.refresh_counts().await;
                Ok(true)
            }
            Err(e) => {
                error!(folder_id = %id, error = %e, "Failed to delete folder");
                self.notifier.notify(Toast::error("Error deleting folder"));
                Err(e)
            }
        }
    }

    // ── Assets ──────────────────────────────────────────────────────────

    /// Validate and store a batch of files, one insert per file.
    ///
    /// A same-named asset at the target location is replaced once the new
    /// row is stored. The cache is refreshed only if the target project is
    /// still open when the batch finishes.
    pub async fn upload(&self, target: UploadTarget, files: Vec<CandidateFile>) -> UploadReport {
        let Some(project_id) = target.project_id.filter(|_| !files.is_empty()) else {
            let message = "Please select a project and files";
            self.notifier.notify(Toast::error(message));
            return UploadReport::aborted(message);
        };
        if let Some(folder_id) = target.folder_id {
            let foreign = self.with_state(|s| {
                s.folder(folder_id)
                    .is_some_and(|folder| folder.project_id != project_id)
            });
            if foreign {
                let message = "Folder does not belong to the selected project";
                self.notifier.notify(Toast::error(message));
                return UploadReport::aborted(message);
            }
        }

        let mut report = UploadReport::default();
        let (accepted, rejected) = self.rules.partition(files);
        for rejection in &rejected {
            self.notifier.notify(Toast::error(rejection.message()));
            report.reject(rejection);
        }
        if accepted.is_empty() {
            return report;
        }

        for file in &accepted {
            match self.store_file(project_id, target.folder_id, file).await {
                Ok(asset) => {
                    debug!(asset_id = %asset.id, name = %asset.name, "Asset uploaded");
                    report.succeeded += 1;
                }
                Err(e) => {
                    error!(name = %file.name, error = %e, "Failed to upload asset");
                    self.notifier
                        .notify(Toast::error(format!("Failed to upload \"{}\"", file.name)));
                    report.fail(&file.name, e.message);
                }
            }
        }

        info!(
            project_id = %project_id,
            succeeded = report.succeeded,
            failed = report.failed(),
            "Upload finished"
        );
        if report.succeeded > 0 {
            self.notifier.notify(Toast::success(report.success_message()));
            if self.active_project_id() == Some(project_id) {
                let _ = self.refresh_assets().await;
            }
            self.refresh_counts().await;
        }
        report
    }

    async fn store_file(
        &self,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
        file: &CandidateFile,
    ) -> AppResult<Asset> {
        let replaced = self
            .store
            .list_assets(
                &AssetQuery::for_project(project_id)
                    .in_folder(FolderScope::exactly(folder_id))
                    .named(&file.name),
            )
            .await?;

        let data = NewAsset::from_bytes(
            Some(project_id),
            folder_id,
            &file.name,
            &file.mime_type,
            &file.bytes,
        );
        let asset = self.store.insert_asset(&data).await?;

        if !replaced.is_empty() {
            let ids: Vec<AssetId> = replaced.iter().map(|a| a.id).collect();
            match self.store.delete_assets(&ids).await {
                Ok(removed) => debug!(name = %file.name, removed, "Replaced same-named assets"),
                Err(e) => warn!(name = %file.name, error = %e, "Failed to remove replaced assets"),
            }
        }
        Ok(asset)
    }

    /// Delete one asset after confirmation.
    pub async fn delete_asset(&self, id: AssetId) -> AppResult<bool> {
        let name = self
            .with_state(|s| s.asset(id).map(|a| a.name.clone()))
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))?;

        if !self.confirm.confirm(&format!("Delete \"{name}\"?")).await {
            return Ok(false);
        }

        match self.store.delete_asset(id).await {
            Ok(()) => {
                self.notifier.notify(Toast::success("Asset deleted"));
                let _ = self.refresh_assets().await;
                self.refresh_counts().await;
                Ok(true)
            }
            Err(e) => {
                error!(asset_id = %id, error = %e, "Failed to delete asset");
                self.notifier.notify(Toast::error("Error deleting asset"));
                Err(e)
            }
        }
    }

    pub async fn download_asset(&self, id: AssetId) -> AppResult<()> {
        let asset = self
            .with_state(|s| s.asset(id).cloned())
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))?;

        match download::deliver_asset(self.sink.as_ref(), &asset).await {
            Ok(()) => {
                self.notifier
                    .notify(Toast::success(format!("Downloaded \"{}\"", asset.name)));
                Ok(())
            }
            Err(e) => {
                error!(asset_id = %id, error = %e, "Download failed");
                self.notifier.notify(Toast::error("Error downloading asset"));
                Err(e)
            }
        }
    }

    // ── Bulk actions ────────────────────────────────────────────────────

    /// Delete every selected asset in one request, after confirmation.
    ///
    /// The selection is cleared only once the store confirms.
    pub async fn bulk_delete(&self) -> AppResult<u64> {
        let ids = self.with_state(|s| s.selection.ids());
        if ids.is_empty() {
            self.notifier.notify(Toast::error("No assets selected"));
            return Ok(0);
        }

        let count = ids.len();
        let prompt = format!("Delete {count} selected asset(s)? This cannot be undone.");
        if !self.confirm.confirm(&prompt).await {
            return Ok(0);
        }

        match self.store.delete_assets(&ids).await {
            Ok(deleted) => {
                info!(requested = count, deleted, "Bulk delete finished");
                self.notifier
                    .notify(Toast::success(format!("{count} asset(s) deleted successfully")));
                self.dispatch(Action::DeselectAll);
                let _ = self.refresh_assets().await;
                self.refresh_counts().await;
                Ok(deleted)
            }
            Err(e) => {
                error!(requested = count, error = %e, "Bulk delete failed");
                self.notifier.notify(Toast::error("Error deleting assets"));
                Err(e)
            }
        }
    }

    /// Download every selected asset, spaced by the configured interval.
    pub async fn bulk_download(&self) -> usize {
        let assets: Vec<Asset> =
            self.with_state(|s| s.selected_assets().into_iter().cloned().collect());
        if assets.is_empty() {
            self.notifier.notify(Toast::error("No assets selected"));
            return 0;
        }

        self.notifier
            .notify(Toast::info(format!("Downloading {} asset(s)...", assets.len())));
        let interval = Duration::from_millis(self.sync.download_interval_ms);
        let delivered = download::deliver_sequentially(self.sink.as_ref(), &assets, interval).await;

        tokio::time::sleep(interval + Duration::from_millis(self.sync.download_settle_ms)).await;
        self.notifier
            .notify(Toast::success(format!("{delivered} asset(s) downloaded")));
        delivered
    }

    fn invalid(&self, errors: &ValidationErrors, fallback: &str) -> AppError {
        let field_errors = errors.field_errors();
        let message = field_errors
            .get("name")
            .into_iter()
            .chain(field_errors.values())
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| fallback.to_string());
        self.notifier.notify(Toast::error(message.clone()));
        AppError::validation(message)
    }
}
