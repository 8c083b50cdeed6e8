//! Query descriptors passed to hosted store list operations.

use serde::{Deserialize, Serialize};

use super::id::{FolderId, ProjectId};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Which folder location an asset query is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "folder_id", rename_all = "snake_case")]
pub enum FolderScope {
    /// No folder restriction.
    #[default]
    Any,
    /// Only assets that are not inside any folder.
    Unfiled,
    /// Only assets directly inside the given folder.
    In(FolderId),
}

impl FolderScope {
    /// Build the scope that matches exactly one location.
    pub fn exactly(folder_id: Option<FolderId>) -> Self {
        match folder_id {
            Some(id) => Self::In(id),
            None => Self::Unfiled,
        }
    }

    /// Check whether an asset's folder falls inside this scope.
    pub fn matches(&self, folder_id: Option<FolderId>) -> bool {
        match self {
            Self::Any => true,
            Self::Unfiled => folder_id.is_none(),
            Self::In(id) => folder_id == Some(*id),
        }
    }
}

/// Filter, order, and bound for an asset listing.
///
/// Results are ordered by upload date, with the store-assigned insertion
/// sequence breaking ties in the same direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetQuery {
    /// Restrict to one project.
    pub project_id: Option<ProjectId>,
    /// Restrict to one folder location.
    #[serde(default)]
    pub folder: FolderScope,
    /// Restrict to an exact asset name.
    pub name: Option<String>,
    /// Upper bound on returned rows.
    pub limit: Option<u32>,
    /// Upload date direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl AssetQuery {
    /// Every asset, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// Assets of a single project, newest first.
    pub fn for_project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// Restrict to a folder location.
    pub fn in_folder(mut self, folder: FolderScope) -> Self {
        self.folder = folder;
        self
    }

    /// Restrict to an exact name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Cap the number of rows.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}
