//! Client-side library state: the cache, navigation, filtering, selection,
//! and the view projections derived from them.

pub mod filter;
pub mod selection;
pub mod state;
pub mod view;

pub use filter::{FilterContext, FolderFilter, GridStatus, normalize_query, visible_assets};
pub use selection::Selection;
pub use state::{Action, CollectionSync, LibraryState, SyncState, View, reduce};
