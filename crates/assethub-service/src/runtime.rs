//! Assembly of both libraries from [`AppConfig`].
//!
//! The binary picks the hosted store; everything else is built here so the
//! configured data directory, storage key, and sync settings reach the
//! controllers in one place.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use assethub_core::config::AppConfig;
use assethub_core::result::AppResult;
use assethub_store::{FileBlobStore, HostedStore, MemoryStore};

use crate::download::DirectorySink;
use crate::hosted::{HostedLibrary, Reconciler};
use crate::local::LocalLibrary;
use crate::notify::{AutoConfirm, TracingNotifier};

/// In-process hosted store honoring the configured delete policy and
/// change channel size.
pub fn memory_store(config: &AppConfig) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(
        config.store.folder_delete,
        config.sync.channel_buffer_size,
    ))
}

/// The running hosted and local libraries plus their background tasks.
#[derive(Debug)]
pub struct Libraries {
    pub hosted: Arc<HostedLibrary>,
    pub local: Arc<LocalLibrary>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Libraries {
    /// Build both libraries, start the reconciler, and load initial data.
    ///
    /// Downloads land in `<data_dir>/downloads`. Without an operator to
    /// answer, every confirmation prompt is declined.
    pub async fn start(
        config: &AppConfig,
        store: Arc<dyn HostedStore>,
        shutdown: CancellationToken,
    ) -> AppResult<Self> {
        let data_dir = PathBuf::from(&config.local.data_dir);
        let notifier = Arc::new(TracingNotifier);
        let confirm = Arc::new(AutoConfirm::no());
        let sink = Arc::new(DirectorySink::new(data_dir.join("downloads")).await?);

        let hosted = Arc::new(HostedLibrary::new(
            store,
            notifier.clone(),
            confirm.clone(),
            sink.clone(),
            &config.upload,
            config.sync.clone(),
        ));
        let reconciler = Reconciler::new(Arc::clone(&hosted))
            .start(shutdown.clone())
            .await?;
        if let Err(e) = hosted.init().await {
            warn!(error = %e, "Hosted library started without initial data");
        }

        let blob = FileBlobStore::new(&data_dir).await?;
        let local = Arc::new(LocalLibrary::new(
            Arc::new(blob),
            notifier,
            confirm,
            sink,
            config.local.clone(),
            &config.upload,
        ));
        if let Ok(count) = local.load().await {
            info!(count, data_dir = %data_dir.display(), "Local library ready");
        }

        Ok(Self {
            hosted,
            local,
            shutdown,
            tasks: vec![reconciler],
        })
    }

    /// Stop a task together with the reconciler, e.g. a store listener
    /// started on the same token.
    pub fn track(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// Cancel the shared token and wait for every tracked task.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        info!("Libraries stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assethub_core::config::FolderDeletePolicy;
    use assethub_entity::{NewAsset, NewFolder, NewProject};

    #[tokio::test]
    async fn test_memory_store_uses_configured_policy() {
        let mut config = AppConfig::default();
        config.store.folder_delete = FolderDeletePolicy::Detach;
        let store = memory_store(&config);

        let project = store.insert_project(&NewProject::new("P", None, None)).await.unwrap();
        let folder = store
            .insert_folder(&NewFolder::new(project.id, None, "F"))
            .await
            .unwrap();
        store
            .insert_asset(&NewAsset::from_bytes(
                Some(project.id),
                Some(folder.id),
                "a.png",
                "image/png",
                b"1",
            ))
            .await
            .unwrap();

        store.delete_folder(folder.id).await.unwrap();
        assert_eq!(store.count_assets(Some(project.id)).await.unwrap(), 1);
    }
}
