//! # assethub-service
//!
//! Application layer for AssetHub. Holds the library state and its pure
//! projections (filtering, selection, view models), the upload pipeline,
//! the hosted library controller with its realtime reconciler, the local
//! single-blob library, sequenced downloads, the design-tool export
//! collaborator, and [`Libraries`], which assembles them from configuration.
//!
//! Controllers follow constructor injection: stores and the user-facing
//! collaborators ([`Notifier`], [`Confirm`], [`DownloadSink`]) are passed
//! in as `Arc` references.

pub mod download;
pub mod export;
pub mod format;
pub mod hosted;
pub mod library;
pub mod local;
pub mod notify;
pub mod runtime;
pub mod upload;

pub use download::{DirectorySink, DownloadSink, DownloadedFile, MemorySink};
pub use export::{ExportFormat, ExportableNode, ExportedFrame, FramePreview, SelectionPreview};
pub use hosted::{HostedLibrary, Reconciler, UploadTarget};
pub use library::{Action, FolderFilter, GridStatus, LibraryState, Selection, SyncState, View};
pub use local::{LocalLibrary, StorageUsage};
pub use notify::{AutoConfirm, Confirm, Notifier, RecordingNotifier, Toast, ToastLevel, TracingNotifier};
pub use runtime::{Libraries, memory_store};
pub use upload::{CandidateFile, Rejection, UploadFailure, UploadReport, UploadRules};
