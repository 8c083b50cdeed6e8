//! The local library: every asset in one serialized blob.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use assethub_core::config::{LocalConfig, UploadConfig};
use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::types::AssetId;
use assethub_entity::{Asset, NewAsset};
use assethub_store::BlobStore;

use crate::download::{self, DownloadSink};
use crate::library::{GridStatus, normalize_query};
use crate::notify::{Confirm, Notifier, Toast};
use crate::upload::{CandidateFile, UploadReport, UploadRules};

/// Storage usage of the local blob against its estimated quota.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageUsage {
    pub used_bytes: u64,
    pub quota_bytes: u64,
    pub ratio: f64,
    /// Usage is past the warning threshold.
    pub warning: bool,
}

#[derive(Debug, Default)]
struct LocalState {
    /// Insertion order; same-named uploads replace in place.
    assets: Vec<Asset>,
    search: String,
}

/// Single-location asset library persisted as one JSON blob.
///
/// The whole collection is read once by [`LocalLibrary::load`] and written
/// back after every mutation. A failed write restores the previous
/// collection.
#[derive(Debug)]
pub struct LocalLibrary {
    blob: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    sink: Arc<dyn DownloadSink>,
    config: LocalConfig,
    rules: UploadRules,
    state: Mutex<LocalState>,
}

impl LocalLibrary {
    pub fn new(
        blob: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
        sink: Arc<dyn DownloadSink>,
        config: LocalConfig,
        upload: &UploadConfig,
    ) -> Self {
        Self {
            blob,
            notifier,
            confirm,
            sink,
            config,
            rules: UploadRules::new(upload),
            state: Mutex::new(LocalState::default()),
        }
    }

    /// Read the collection from the blob store.
    ///
    /// An unreadable blob leaves the library empty.
    pub async fn load(&self) -> AppResult<usize> {
        let loaded = match self.blob.get(&self.config.storage_key).await {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Asset>>(&raw).map_err(AppError::from),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        match loaded {
            Ok(assets) => {
                info!(count = assets.len(), key = %self.config.storage_key, "Local library loaded");
                state.assets = assets;
                Ok(state.assets.len())
            }
            Err(e) => {
                error!(error = %e, "Failed to load local library");
                state.assets.clear();
                self.notifier
                    .notify(Toast::error("Error loading assets from storage"));
                Err(e)
            }
        }
    }

    /// Stored assets in insertion order.
    pub async fn assets(&self) -> Vec<Asset> {
        self.state.lock().await.assets.clone()
    }

    pub async fn search(&self, raw: &str) {
        self.state.lock().await.search = normalize_query(raw);
    }

    /// Assets matching the search, newest upload first.
    pub async fn visible(&self) -> Vec<Asset> {
        let state = self.state.lock().await;
        let mut visible: Vec<Asset> = state
            .assets
            .iter()
            .rev()
            .filter(|a| state.search.is_empty() || a.name.to_lowercase().contains(&state.search))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        visible
    }

    pub async fn grid_status(&self) -> GridStatus {
        let count = self.visible().await.len();
        GridStatus::from_visible(count, &self.state.lock().await.search)
    }

    pub async fn usage(&self) -> StorageUsage {
        let used_bytes = used_bytes(&self.state.lock().await.assets);
        let quota_bytes = self.config.estimated_quota_bytes;
        let ratio = if quota_bytes == 0 {
            1.0
        } else {
            used_bytes as f64 / quota_bytes as f64
        };
        StorageUsage {
            used_bytes,
            quota_bytes,
            ratio,
            warning: ratio > self.config.warning_threshold,
        }
    }

    /// Validate, encode, and store a batch of files.
    ///
    /// Files are checked first; then, if the blob is already near its quota,
    /// the batch is refused before anything is written. Same-named files
    /// replace the stored asset.
    pub async fn upload(&self, files: Vec<CandidateFile>) -> UploadReport {
        let mut report = UploadReport::default();
        if files.is_empty() {
            return report;
        }

        let (accepted, rejected) = self.rules.partition(files);
        for rejection in &rejected {
            self.notifier.notify(Toast::error(rejection.message()));
            report.reject(rejection);
        }
        if accepted.is_empty() {
            return report;
        }

        let mut state = self.state.lock().await;
        let ceiling = self.config.estimated_quota_bytes as f64 * self.config.write_headroom;
        if used_bytes(&state.assets) as f64 >= ceiling {
            let message = "Storage limit reached. Please delete some assets.";
            warn!(used = used_bytes(&state.assets), ceiling, "Upload refused by storage pre-flight");
            self.notifier.notify(Toast::error(message));
            report.aborted = Some(message.to_string());
            return report;
        }

        let previous = state.assets.clone();
        for file in &accepted {
            let asset = NewAsset::from_bytes(None, None, &file.name, &file.mime_type, &file.bytes)
                .into_asset();
            match state.assets.iter().position(|a| a.name == asset.name) {
                Some(index) => state.assets[index] = asset,
                None => state.assets.push(asset),
            }
        }

        if let Err(e) = self.save(&state.assets).await {
            state.assets = previous;
            let message = save_failure_message(&e);
            for file in &accepted {
                report.fail(&file.name, message);
            }
            report.aborted = Some(message.to_string());
            return report;
        }

        report.succeeded = accepted.len();
        info!(succeeded = report.succeeded, failed = report.failed(), "Local upload finished");
        self.notifier.notify(Toast::success(report.success_message()));
        report
    }

    /// Delete one asset after confirmation. Returns whether it was removed.
    pub async fn delete(&self, id: AssetId) -> AppResult<bool> {
        let Some(name) = self.name_of(id).await else {
            return Ok(false);
        };
        if !self.confirm.confirm(&format!("Delete \"{name}\"?")).await {
            return Ok(false);
        }

        let mut state = self.state.lock().await;
        let previous = state.assets.clone();
        state.assets.retain(|a| a.id != id);
        if let Err(e) = self.save(&state.assets).await {
            state.assets = previous;
            return Err(e);
        }
        self.notifier.notify(Toast::success("Asset deleted"));
        Ok(true)
    }

    /// Remove every asset after confirmation.
    pub async fn clear_all(&self) -> AppResult<bool> {
        let count = self.state.lock().await.assets.len();
        if count == 0 {
            return Ok(false);
        }
        let prompt =
            format!("Are you sure you want to delete all {count} assets? This cannot be undone.");
        if !self.confirm.confirm(&prompt).await {
            return Ok(false);
        }

        let mut state = self.state.lock().await;
        let previous = std::mem::take(&mut state.assets);
        if let Err(e) = self.save(&state.assets).await {
            state.assets = previous;
            return Err(e);
        }
        self.notifier.notify(Toast::success("All assets cleared"));
        Ok(true)
    }

    pub async fn download(&self, id: AssetId) -> AppResult<()> {
        let asset = self
            .state
            .lock()
            .await
            .assets
            .iter()
            .find(|a| a.id == id)
            .cloned()
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

    async fn name_of(&self, id: AssetId) -> Option<String> {
        self.state
            .lock()
            .await
            .assets
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.clone())
    }

    async fn save(&self, assets: &[Asset]) -> AppResult<()> {
        let result = match serde_json::to_string(assets) {
            Ok(raw) => self.blob.set(&self.config.storage_key, &raw).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            error!(error = %e, "Failed to save local library");
            self.notifier.notify(Toast::error(save_failure_message(e)));
        }
        result
    }
}

fn used_bytes(assets: &[Asset]) -> u64 {
    assets.iter().map(Asset::encoded_len).sum()
}

fn save_failure_message(error: &AppError) -> &'static str {
    if error.kind == ErrorKind::Quota {
        "Storage quota exceeded. Please delete some assets."
    } else {
        "Error saving assets to storage"
    }
}
