//! LISTEN/NOTIFY bridge from the row triggers into a [`ChangeFeed`].

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::events::ChangeEvent;
use assethub_core::result::AppResult;
use assethub_store::ChangeFeed;

use crate::CHANGE_CHANNEL;
use crate::store::PgStore;

impl PgStore {
    /// Start forwarding trigger notifications into this store's feed.
    ///
    /// The task runs until `shutdown` is cancelled. Lost connections are
    /// re-established by the listener itself; notifications sent while
    /// disconnected are not replayed.
    pub async fn start_listener(&self, shutdown: CancellationToken) -> AppResult<JoinHandle<()>> {
        spawn_listener(self.pool(), self.feed(), shutdown).await
    }
}

async fn spawn_listener(
    pool: &PgPool,
    feed: Arc<ChangeFeed>,
    shutdown: CancellationToken,
) -> AppResult<JoinHandle<()>> {
    let mut listener = PgListener::connect_with(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to open notification listener", e)
    })?;
    listener.listen(CHANGE_CHANNEL).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to LISTEN on {CHANGE_CHANNEL}"),
            e,
        )
    })?;
    info!(channel = CHANGE_CHANNEL, "Listening for row changes");

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Change listener stopped");
                    break;
                }
                received = listener.recv() => match received {
                    Ok(notification) => match parse_notification(notification.payload()) {
                        Ok(event) => feed.publish(event).await,
                        Err(e) => warn!(error = %e, "Ignoring malformed change notification"),
                    },
                    Err(e) => {
                        warn!(error = %e, "Change listener error, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                },
            }
        }
    }))
}

fn parse_notification(payload: &str) -> AppResult<ChangeEvent> {
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use assethub_core::events::{ChangeKind, Table};

    use super::*;

    #[test]
    fn test_parse_trigger_payload() {
        let payload = r#"{"table":"folders","type":"INSERT","row_id":"0190b7a4-5e1c-7c3d-8a6b-2f1e9d0c4b3a"}"#;
        let event = parse_notification(payload).expect("parse");
        assert_eq!(event.table, Table::Folders);
        assert_eq!(event.kind, ChangeKind::Insert);
        assert!(event.row_id.is_some());
    }

    #[test]
    fn test_parse_rejects_unknown_table() {
        assert!(parse_notification(r#"{"table":"users","type":"INSERT","row_id":null}"#).is_err());
    }
}
