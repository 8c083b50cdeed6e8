//! Project domain entities.

pub mod model;

pub use model::{DEFAULT_PROJECT_COLOR, NewProject, Project};
