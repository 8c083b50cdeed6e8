//! # assethub-store
//!
//! Store collaborators for AssetHub. [`HostedStore`] models the three-table
//! hosted backend with per-table change notifications; [`BlobStore`] models
//! the single-key blob used by the local library. In-memory and file-backed
//! providers live here; the PostgreSQL provider lives in
//! `assethub-database`.

pub mod blob;
pub mod feed;
pub mod memory;
pub mod traits;

pub use blob::{FileBlobStore, MemoryBlobStore};
pub use feed::ChangeFeed;
pub use memory::MemoryStore;
pub use traits::{BlobStore, ChangeStream, HostedStore};
