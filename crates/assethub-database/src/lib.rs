//! # assethub-database
//!
//! PostgreSQL implementation of the hosted store: connection management,
//! embedded migrations, the three-table [`PgStore`], and a LISTEN/NOTIFY
//! bridge that feeds row changes into the store's change channels.

pub mod connection;
pub mod listener;
pub mod migration;
pub mod store;

pub use connection::DatabasePool;
pub use store::PgStore;

/// Notification channel the row triggers publish on.
pub const CHANGE_CHANNEL: &str = "assethub_changes";
