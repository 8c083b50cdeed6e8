//! Row-level change notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// The three hosted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// The `projects` table.
    Projects,
    /// The `folders` table.
    Folders,
    /// The `assets` table.
    Assets,
}

impl Table {
    /// Every table, in dependency order.
    pub const ALL: [Table; 3] = [Table::Projects, Table::Folders, Table::Assets];

    /// The table name as used in SQL and notification channels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Folders => "folders",
            Self::Assets => "assets",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "projects" => Ok(Self::Projects),
            "folders" => Ok(Self::Folders),
            "assets" => Ok(Self::Assets),
            other => Err(AppError::validation(format!("Unknown table: {other}"))),
        }
    }
}

/// The kind of row mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

/// A notification that some row of a table changed.
///
/// Consumers treat it as "the collection is stale" and never patch rows
/// from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Table that changed.
    pub table: Table,
    /// Kind of mutation.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Primary key of the affected row, when the source reports it.
    pub row_id: Option<Uuid>,
    /// When the event was observed.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a new change event stamped with the current time.
    pub fn new(table: Table, kind: ChangeKind, row_id: Option<Uuid>) -> Self {
        Self {
            table,
            kind,
            row_id,
            timestamp: Utc::now(),
        }
    }
}
