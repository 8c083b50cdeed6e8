//! Realtime reconciliation against the in-memory change feed.

mod helpers;

use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use assethub_entity::{NewAsset, NewFolder, NewProject};
use assethub_service::{LibraryState, Reconciler, View};
use assethub_store::HostedStore;

use helpers::TestLibrary;

async fn wait_until(t: &TestLibrary, check: impl Fn(&LibraryState) -> bool) {
    let mut rx = t.library.subscribe();
    timeout(Duration::from_secs(5), rx.wait_for(|state| check(state)))
        .await
        .expect("state reached in time")
        .expect("library alive");
}

#[tokio::test]
async fn test_external_changes_are_refetched() {
    let t = TestLibrary::new();
    let shutdown = CancellationToken::new();
    let handle = Reconciler::new(t.library.clone())
        .start(shutdown.clone())
        .await
        .unwrap();

    let project = t
        .store
        .insert_project(&NewProject::new("Remote", None, None))
        .await
        .unwrap();
    wait_until(&t, |s| s.projects.len() == 1).await;

    t.library.open_project(project.id).await.unwrap();
    t.store
        .insert_folder(&NewFolder::new(project.id, None, "Logos"))
        .await
        .unwrap();
    wait_until(&t, |s| s.folders.len() == 1).await;

    t.store
        .insert_asset(&NewAsset::from_bytes(Some(project.id), None, "a.png", "image/png", b"abc"))
        .await
        .unwrap();
    wait_until(&t, |s| s.assets.len() == 1 && s.storage_bytes == 3).await;
    assert_eq!(t.library.with_state(|s| s.asset_counts[&project.id]), 1);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_removed_project_returns_to_dashboard() {
    let t = TestLibrary::new();
    let project = t.open_project("Shared").await;
    let shutdown = CancellationToken::new();
    let handle = Reconciler::new(t.library.clone())
        .start(shutdown.clone())
        .await
        .unwrap();

    t.store.delete_project(project.id).await.unwrap();
    wait_until(&t, |s| s.view == View::Dashboard && s.projects.is_empty()).await;

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_burst_of_changes_settles() {
    let t = TestLibrary::new();
    let project = t.open_project("Burst").await;
    let shutdown = CancellationToken::new();
    let handle = Reconciler::new(t.library.clone())
        .start(shutdown.clone())
        .await
        .unwrap();

    for i in 0..20 {
        t.store
            .insert_asset(&NewAsset::from_bytes(
                Some(project.id),
                None,
                &format!("{i}.png"),
                "image/png",
                b"x",
            ))
            .await
            .unwrap();
    }
    wait_until(&t, |s| s.assets.len() == 20).await;

    shutdown.cancel();
    handle.await.unwrap();
}
