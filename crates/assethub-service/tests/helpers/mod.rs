//! Shared fixtures for library integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use assethub_core::config::{FolderDeletePolicy, SyncConfig, UploadConfig};
use assethub_entity::Project;
use assethub_service::{AutoConfirm, CandidateFile, HostedLibrary, MemorySink, RecordingNotifier};
use assethub_store::{HostedStore, MemoryStore};

/// A hosted library over an in-memory store, with recording collaborators.
pub struct TestLibrary {
    pub library: Arc<HostedLibrary>,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub confirm: Arc<AutoConfirm>,
    pub sink: Arc<MemorySink>,
}

impl TestLibrary {
    /// Library that accepts every confirmation prompt.
    pub fn new() -> Self {
        Self::build(AutoConfirm::yes(), FolderDeletePolicy::Cascade)
    }

    /// Library that declines every confirmation prompt.
    pub fn declining() -> Self {
        Self::build(AutoConfirm::no(), FolderDeletePolicy::Cascade)
    }

    pub fn with_policy(policy: FolderDeletePolicy) -> Self {
        Self::build(AutoConfirm::yes(), policy)
    }

    fn build(confirm: AutoConfirm, policy: FolderDeletePolicy) -> Self {
        let store = Arc::new(MemoryStore::new(policy, 64));
        let hosted: Arc<dyn HostedStore> = store.clone();
        Self::over(hosted, store, confirm)
    }

    /// Library over an arbitrary store; `memory` is the store underneath.
    pub fn over(hosted: Arc<dyn HostedStore>, memory: Arc<MemoryStore>, confirm: AutoConfirm) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let confirm = Arc::new(confirm);
        let sink = Arc::new(MemorySink::new());
        let library = Arc::new(HostedLibrary::new(
            hosted,
            notifier.clone(),
            confirm.clone(),
            sink.clone(),
            &UploadConfig::default(),
            SyncConfig::default(),
        ));
        Self {
            library,
            store: memory,
            notifier,
            confirm,
            sink,
        }
    }

    /// Create a project through the library and open it.
    pub async fn open_project(&self, name: &str) -> Project {
        let project = self
            .library
            .create_project(name, None, None)
            .await
            .expect("create project");
        self.library.open_project(project.id).await.expect("open project");
        project
    }

    /// Names of the assets the grid currently shows.
    pub fn visible_names(&self) -> Vec<String> {
        self.library
            .with_state(|s| s.visible_assets().iter().map(|a| a.name.clone()).collect())
    }
}

pub fn png(name: &str, len: usize) -> CandidateFile {
    CandidateFile::new(name, "image/png", vec![7; len])
}
