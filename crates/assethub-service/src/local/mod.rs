//! Local single-blob library.

pub mod service;

pub use service::{LocalLibrary, StorageUsage};
