//! Visible-subset computation for the asset grid.
//!
//! The same function drives rendering and "select all", so a bulk action can
//! never reach an asset the user cannot see.

use serde::{Deserialize, Serialize};

use assethub_core::types::{FolderId, ProjectId};
use assethub_entity::{Asset, FolderTree};

/// Folder chip selection inside a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FolderFilter {
    /// The "All" chip at the current navigation level.
    #[default]
    All,
    /// One specific folder.
    Folder(FolderId),
}

/// Inputs of [`visible_assets`].
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub project_id: Option<ProjectId>,
    pub folder: FolderFilter,
    pub parent: Option<FolderId>,
    /// Normalized query, see [`normalize_query`].
    pub query: &'a str,
    pub folders: &'a FolderTree,
}

/// Trim and lowercase a raw search box value.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether a single asset passes every filter stage.
pub fn is_visible(asset: &Asset, ctx: &FilterContext<'_>) -> bool {
    if let Some(project_id) = ctx.project_id {
        if asset.project_id != Some(project_id) {
            return false;
        }
    }

    let in_scope = match (ctx.folder, ctx.parent) {
        (FolderFilter::Folder(folder_id), _) => asset.folder_id == Some(folder_id),
        (FolderFilter::All, Some(parent)) => asset.folder_id == Some(parent),
        (FolderFilter::All, None) => asset
            .folder_id
            .is_none_or(|folder_id| ctx.folders.is_root(folder_id)),
    };
    if !in_scope {
        return false;
    }

    ctx.query.is_empty() || asset.name.to_lowercase().contains(ctx.query)
}

/// The ordered visible subset of `assets`.
///
/// Input order is preserved, so store order (newest first) carries through.
pub fn visible_assets<'a>(assets: &'a [Asset], ctx: &FilterContext<'_>) -> Vec<&'a Asset> {
    assets.iter().filter(|asset| is_visible(asset, ctx)).collect()
}

/// What the grid shows after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridStatus {
    Populated(usize),
    /// Nothing to show and no query active.
    NoAssets,
    /// A query is active and nothing matched.
    NoMatches,
}

impl GridStatus {
    pub fn from_visible(count: usize, query: &str) -> Self {
        match count {
            0 if !query.is_empty() => Self::NoMatches,
            0 => Self::NoAssets,
            n => Self::Populated(n),
        }
    }

    /// Count label above the grid.
    pub fn label(&self) -> String {
        match self {
            Self::NoMatches => "No matching assets".to_string(),
            Self::NoAssets => "0 assets".to_string(),
            Self::Populated(1) => "1 asset".to_string(),
            Self::Populated(n) => format!("{n} assets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use assethub_entity::{Folder, NewAsset};

    use super::*;

    fn asset(project: ProjectId, folder: Option<FolderId>, name: &str) -> Asset {
        NewAsset::from_bytes(Some(project), folder, name, "image/png", b"x").into_asset()
    }

    fn folder(project: ProjectId, parent: Option<FolderId>, name: &str) -> Folder {
        Folder {
            id: FolderId::new(),
            project_id: project,
            parent_id: parent,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn names(assets: &[&Asset]) -> Vec<String> {
        assets.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let project = ProjectId::new();
        let assets = vec![
            asset(project, None, "cat.png"),
            asset(project, None, "dog.png"),
            asset(project, None, "Category.svg"),
        ];
        let tree = FolderTree::default();
        let query = normalize_query("  CAT ");
        let ctx = FilterContext {
            project_id: Some(project),
            folder: FolderFilter::All,
            parent: None,
            query: &query,
            folders: &tree,
        };

        assert_eq!(names(&visible_assets(&assets, &ctx)), ["cat.png", "Category.svg"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let project = ProjectId::new();
        let other = ProjectId::new();
        let logos = folder(project, None, "Logos");
        let nested = folder(project, Some(logos.id), "2024");
        let tree = FolderTree::new([&logos, &nested]);
        let assets = vec![
            asset(project, None, "cat.png"),
            asset(project, Some(logos.id), "cat-logo.png"),
            asset(project, Some(nested.id), "cat-2024.png"),
            asset(other, None, "cat-other.png"),
            asset(project, None, "dog.png"),
        ];

        for (folder_filter, parent) in [
            (FolderFilter::All, None),
            (FolderFilter::Folder(logos.id), None),
            (FolderFilter::All, Some(logos.id)),
        ] {
            let ctx = FilterContext {
                project_id: Some(project),
                folder: folder_filter,
                parent,
                query: "cat",
                folders: &tree,
            };
            let once: Vec<Asset> = visible_assets(&assets, &ctx).into_iter().cloned().collect();
            let twice: Vec<Asset> = visible_assets(&once, &ctx).into_iter().cloned().collect();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_nested_folder_scoping() {
        let marketing = ProjectId::new();
        let logos = folder(marketing, None, "Logos");
        let year = folder(marketing, Some(logos.id), "2024");
        let tree = FolderTree::new([&logos, &year]);
        let year_id = tree.resolve_path(marketing, "Logos/2024").expect("path");
        let assets = vec![
            asset(marketing, Some(year_id), "banner.png"),
            asset(marketing, Some(logos.id), "mark.svg"),
            asset(marketing, None, "loose.png"),
        ];
        let view = |folder: FolderFilter, parent: Option<FolderId>| {
            let ctx = FilterContext {
                project_id: Some(marketing),
                folder,
                parent,
                query: "",
                folders: &tree,
            };
            names(&visible_assets(&assets, &ctx))
        };

        assert_eq!(view(FolderFilter::Folder(logos.id), None), ["mark.svg"]);
        assert_eq!(view(FolderFilter::All, None), ["mark.svg", "loose.png"]);
        assert_eq!(view(FolderFilter::All, Some(year_id)), ["banner.png"]);
        assert_eq!(view(FolderFilter::Folder(year_id), Some(logos.id)), ["banner.png"]);
    }

    #[test]
    fn test_grid_status_distinguishes_empty_states() {
        assert_eq!(GridStatus::from_visible(0, ""), GridStatus::NoAssets);
        assert_eq!(GridStatus::from_visible(0, "cat"), GridStatus::NoMatches);
        assert_eq!(GridStatus::from_visible(1, "cat").label(), "1 asset");
        assert_eq!(GridStatus::from_visible(3, "").label(), "3 assets");
        assert_eq!(GridStatus::NoMatches.label(), "No matching assets");
        assert_eq!(GridStatus::NoAssets.label(), "0 assets");
    }
}
