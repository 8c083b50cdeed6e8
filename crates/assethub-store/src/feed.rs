//! In-process change feed with one broadcast channel per table.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::sync::broadcast;

use assethub_core::events::{ChangeEvent, Table};

use crate::traits::ChangeStream;

/// Per-table broadcast fan-out shared by store providers.
#[derive(Debug)]
pub struct ChangeFeed {
    /// Table → broadcast sender
    channels: RwLock<HashMap<Table, broadcast::Sender<ChangeEvent>>>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl ChangeFeed {
    /// Create a feed whose channels buffer `buffer_size` events each.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Publish an event to its table's subscribers. Events for tables with
    /// no subscribers are dropped.
    pub async fn publish(&self, event: ChangeEvent) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&event.table) {
            let _ = tx.send(event);
        }
    }

    /// Subscribe to one table.
    pub async fn subscribe(&self, table: Table) -> ChangeStream {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(table)
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        tx.subscribe()
    }
}
