//! Change events emitted by hosted stores.
//!
//! Events are published on a per-table channel and consumed by the
//! reconciliation loop, which re-fetches the whole affected collection.

pub mod change;

pub use change::{ChangeEvent, ChangeKind, Table};
