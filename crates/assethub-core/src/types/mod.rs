//! Core type definitions used across the AssetHub workspace.

pub mod id;
pub mod query;

pub use id::*;
pub use query::{AssetQuery, FolderScope, SortDirection};
