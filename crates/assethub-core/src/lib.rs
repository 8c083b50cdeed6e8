//! # assethub-core
//!
//! Core crate for AssetHub. Contains configuration schemas, typed
//! identifiers, store change events, query types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other AssetHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
