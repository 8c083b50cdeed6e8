//! Pure projections from [`LibraryState`] to what a renderer draws.

use chrono::{DateTime, Utc};
use serde::Serialize;

use assethub_core::types::{AssetId, FolderId, ProjectId};

use crate::format::{format_date, format_file_size};

use super::filter::FolderFilter;
use super::state::LibraryState;

/// One card on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCard {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub asset_count: u64,
    pub folder_count: usize,
}

/// A folder chip at the current navigation level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderChip {
    pub id: FolderId,
    pub name: String,
    pub active: bool,
    pub has_subfolders: bool,
}

/// The chip row above the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderBar {
    /// Present at the root level, with whether it is the active chip.
    pub all_chip: Option<bool>,
    /// Whether a back chip is shown (inside a parent folder).
    pub back: bool,
    /// Name of the folder being browsed.
    pub breadcrumb: Option<String>,
    pub chips: Vec<FolderChip>,
}

/// One card in the asset grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCard {
    pub id: AssetId,
    pub name: String,
    /// Image source (the inline data URL).
    pub src: String,
    pub folder_badge: Option<String>,
    pub size_label: String,
    pub date_label: String,
    pub selected: bool,
    pub show_checkbox: bool,
}

/// Dashboard cards, in project order.
pub fn project_cards(state: &LibraryState) -> Vec<ProjectCard> {
    state
        .projects
        .iter()
        .map(|project| ProjectCard {
            id: project.id,
            name: project.name.clone(),
            description: project
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
            color: project.color.clone(),
            asset_count: state.asset_counts.get(&project.id).copied().unwrap_or(0),
            folder_count: state
                .folders
                .iter()
                .filter(|f| f.project_id == project.id)
                .count(),
        })
        .collect()
}

/// Chip row for the open project, or `None` on the dashboard.
pub fn folder_bar(state: &LibraryState) -> Option<FolderBar> {
    let project_id = state.active_project_id()?;
    let tree = state.folder_tree();

    let chips = tree
        .children(project_id, state.parent)
        .into_iter()
        .map(|folder| FolderChip {
            id: folder.id,
            name: folder.name.clone(),
            active: state.folder == FolderFilter::Folder(folder.id),
            has_subfolders: tree.has_children(folder.id),
        })
        .collect();

    Some(match state.parent {
        Some(parent) => FolderBar {
            all_chip: None,
            back: true,
            breadcrumb: tree.get(parent).map(|f| f.name.clone()),
            chips,
        },
        None => FolderBar {
            all_chip: Some(state.folder == FolderFilter::All),
            back: false,
            breadcrumb: None,
            chips,
        },
    })
}

/// Cards for the visible assets.
pub fn asset_cards(state: &LibraryState, now: DateTime<Utc>) -> Vec<AssetCard> {
    let show_checkbox = state.selection.is_active();
    state
        .visible_assets()
        .into_iter()
        .map(|asset| AssetCard {
            id: asset.id,
            name: asset.name.clone(),
            src: asset.data.clone(),
            folder_badge: asset
                .folder_id
                .and_then(|id| state.folder(id))
                .map(|f| f.name.clone()),
            size_label: format_file_size(asset.size.max(0) as u64),
            date_label: format_date(asset.upload_date, now),
            selected: state.selection.contains(asset.id),
            show_checkbox,
        })
        .collect()
}

/// Label of the bulk-action bar, e.g. "3 selected".
pub fn selection_label(state: &LibraryState) -> String {
    format!("{} selected", state.selection.len())
}

/// Storage usage shown in the header.
pub fn storage_label(state: &LibraryState) -> String {
    format_file_size(state.storage_bytes)
}
