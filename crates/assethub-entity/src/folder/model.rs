//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use assethub_core::types::{FolderId, ProjectId};

/// A folder inside a project. Folders form a tree per project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Parent folder (None for root folders).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFolder {
    /// Owning project.
    pub project_id: ProjectId,
    /// Parent folder (None for root).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    #[validate(length(min = 1, max = 200, message = "Please enter a folder name"))]
    pub name: String,
}

impl NewFolder {
    /// Build a create payload with a trimmed name.
    pub fn new(project_id: ProjectId, parent_id: Option<FolderId>, name: &str) -> Self {
        Self {
            project_id,
            parent_id,
            name: name.trim().to_string(),
        }
    }
}
