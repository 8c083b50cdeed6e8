//! # assethub-entity
//!
//! Domain entity models for AssetHub. Every struct in this crate is either
//! a row of one of the three hosted tables or a create payload for one.
//! Row types derive `sqlx::FromRow`; create payloads derive
//! `validator::Validate`.

pub mod asset;
pub mod data_url;
pub mod folder;
pub mod project;

pub use asset::{Asset, NewAsset};
pub use folder::{Folder, FolderTree, NewFolder};
pub use project::{NewProject, Project};
