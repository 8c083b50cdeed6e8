//! Integration tests against a live PostgreSQL.
//!
//! Set `ASSETHUB_TEST_DATABASE_URL` to run them; otherwise they return early.

use std::time::Duration;

use assethub_core::config::{DatabaseConfig, FolderDeletePolicy};
use assethub_core::events::{ChangeKind, Table};
use assethub_core::types::AssetQuery;
use assethub_database::{DatabasePool, PgStore, migration};
use assethub_entity::{NewAsset, NewFolder, NewProject};
use assethub_store::HostedStore;
use tokio_util::sync::CancellationToken;

async fn test_store() -> Option<PgStore> {
    let url = std::env::var("ASSETHUB_TEST_DATABASE_URL").ok()?;
    let config = DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    };
    let pool = DatabasePool::connect(&config).await.expect("connect");
    migration::run_migrations(pool.pool()).await.expect("migrate");
    Some(PgStore::new(
        pool.pool().clone(),
        FolderDeletePolicy::Cascade,
        64,
    ))
}

#[tokio::test]
async fn test_project_cascade() {
    let Some(store) = test_store().await else {
        return;
    };

    let project = store
        .insert_project(&NewProject::new("Cascade", None, None))
        .await
        .unwrap();
    let folder = store
        .insert_folder(&NewFolder::new(project.id, None, "Logos"))
        .await
        .unwrap();
    store
        .insert_asset(&NewAsset::from_bytes(
            Some(project.id),
            Some(folder.id),
            "logo.png",
            "image/png",
            b"png",
        ))
        .await
        .unwrap();

    assert_eq!(store.count_assets(Some(project.id)).await.unwrap(), 1);
    store.delete_project(project.id).await.unwrap();
    assert_eq!(store.count_assets(Some(project.id)).await.unwrap(), 0);
    assert!(store.list_folders(Some(project.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listener_forwards_inserts() {
    let Some(store) = test_store().await else {
        return;
    };
    let shutdown = CancellationToken::new();
    let handle = store.start_listener(shutdown.clone()).await.unwrap();
    let mut rx = store.subscribe(Table::Projects).await.unwrap();

    let project = store
        .insert_project(&NewProject::new("Notify", None, None))
        .await
        .unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("notification in time")
        .unwrap();
    assert_eq!(event.kind, ChangeKind::Insert);
    assert_eq!(event.row_id, Some(project.id.into_uuid()));

    let listed = store
        .list_assets(&AssetQuery::for_project(project.id).limit(200))
        .await
        .unwrap();
    assert!(listed.is_empty());

    store.delete_project(project.id).await.unwrap();
    shutdown.cancel();
    handle.await.unwrap();
}
