//! Hosted library: projects, folders, and assets in a shared store, kept
//! in sync through change notifications.

pub mod service;
pub mod sync;

pub use service::{HostedLibrary, UploadTarget};
pub use sync::Reconciler;
