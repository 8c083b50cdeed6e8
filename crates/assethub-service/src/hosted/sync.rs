//! Realtime reconciliation: change notifications drive full refetches.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use assethub_core::events::{ChangeEvent, Table};
use assethub_core::result::AppResult;
use assethub_store::ChangeStream;

use super::service::HostedLibrary;

/// Subscribes to every table and refetches whatever changed.
///
/// A burst of notifications for one table collapses into a single refetch.
/// A lagged receiver counts as a change, since a refetch covers whatever
/// was missed.
#[derive(Debug, Clone)]
pub struct Reconciler {
    library: Arc<HostedLibrary>,
}

impl Reconciler {
    pub fn new(library: Arc<HostedLibrary>) -> Self {
        Self { library }
    }

    /// Subscribe and spawn the loop. It runs until `shutdown` is cancelled
    /// or the store closes its channels.
    pub async fn start(self, shutdown: CancellationToken) -> AppResult<JoinHandle<()>> {
        let store = Arc::clone(self.library.store());
        let mut projects = store.subscribe(Table::Projects).await?;
        let mut folders = store.subscribe(Table::Folders).await?;
        let mut assets = store.subscribe(Table::Assets).await?;
        info!(provider = store.provider_type(), "Reconciler subscribed to change feed");

        Ok(tokio::spawn(async move {
            loop {
                let (table, received) = tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Reconciler stopped");
                        break;
                    }
                    received = projects.recv() => (Table::Projects, received),
                    received = folders.recv() => (Table::Folders, received),
                    received = assets.recv() => (Table::Assets, received),
                };

                let stream = match table {
                    Table::Projects => &mut projects,
                    Table::Folders => &mut folders,
                    Table::Assets => &mut assets,
                };
                if !settle(table, received, stream) {
                    info!(table = %table, "Change feed closed, reconciler stopping");
                    break;
                }

                self.library.apply_change(table).await;
            }
        }))
    }
}

/// Drain queued notifications for `table`. Returns false once the channel
/// is closed.
fn settle(table: Table, received: Result<ChangeEvent, RecvError>, stream: &mut ChangeStream) -> bool {
    match received {
        Ok(event) => debug!(table = %table, kind = ?event.kind, row_id = ?event.row_id, "Change received"),
        Err(RecvError::Lagged(skipped)) => warn!(table = %table, skipped, "Change feed lagged"),
        Err(RecvError::Closed) => return false,
    }

    let mut coalesced = 0usize;
    loop {
        match stream.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => coalesced += 1,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Closed) => break,
        }
    }
    if coalesced > 0 {
        debug!(table = %table, coalesced, "Coalesced queued changes");
    }
    true
}
