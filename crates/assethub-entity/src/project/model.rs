//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use assethub_core::types::ProjectId;

/// Accent color given to projects created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#667eea";

/// A top-level container for folders and assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Accent color as a `#rrggbb` string.
    pub color: String,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new project.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProject {
    /// Display name.
    #[validate(length(min = 1, max = 200, message = "Please enter a project name"))]
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Accent color.
    #[validate(length(equal = 7, message = "Color must be a #rrggbb value"))]
    pub color: String,
}

impl NewProject {
    /// Build a create payload, trimming inputs and filling in the default
    /// color.
    pub fn new(name: &str, description: Option<&str>, color: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            color: color
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_PROJECT_COLOR)
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_trims_and_defaults() {
        let project = NewProject::new("  Marketing ", Some("   "), None);
        assert_eq!(project.name, "Marketing");
        assert!(project.description.is_none());
        assert_eq!(project.color, DEFAULT_PROJECT_COLOR);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_blank_name_fails_validation() {
        let project = NewProject::new("   ", None, Some("#ff0000"));
        assert!(project.validate().is_err());
    }
}
