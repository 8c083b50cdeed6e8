//! Design-tool export: selected frames rendered to PNG or SVG and turned
//! into upload candidates.

pub mod frames;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use assethub_core::result::AppResult;

pub use frames::{ExportedFrame, FramePreview, SelectionPreview, export_frames, preview_selection};

/// Requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "UPPERCASE")]
pub enum ExportFormat {
    Png { scale: f64 },
    Svg,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png { .. } => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png { .. } => "png",
            Self::Svg => "svg",
        }
    }

    /// Factor applied to the node size for the reported dimensions.
    pub fn scale(&self) -> f64 {
        match self {
            Self::Png { scale } => *scale,
            Self::Svg => 1.0,
        }
    }

    /// Renderer settings for this format.
    pub fn settings(&self) -> ExportSettings {
        match self {
            Self::Png { scale } => ExportSettings::Png {
                constraint: Constraint::Scale(*scale),
            },
            Self::Svg => ExportSettings::Svg {
                outline_text: true,
                id_attribute: false,
                simplify_stroke: true,
            },
        }
    }
}

/// How a PNG render is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    Scale(f64),
    Width(u32),
}

/// Settings passed to a node's renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportSettings {
    Png {
        constraint: Constraint,
    },
    Svg {
        outline_text: bool,
        id_attribute: bool,
        simplify_stroke: bool,
    },
}

/// A node in the design tool's current selection.
#[async_trait]
pub trait ExportableNode: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn width(&self) -> f64;

    fn height(&self) -> f64;

    /// Whether the node can be rendered at all.
    fn can_export(&self) -> bool {
        true
    }

    /// Render the node to encoded image bytes.
    async fn export(&self, settings: &ExportSettings) -> AppResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_settings_outline_text() {
        assert_eq!(
            ExportFormat::Svg.settings(),
            ExportSettings::Svg {
                outline_text: true,
                id_attribute: false,
                simplify_stroke: true,
            }
        );
        assert_eq!(ExportFormat::Svg.scale(), 1.0);
    }

    #[test]
    fn test_format_from_json() {
        let format: ExportFormat = serde_json::from_str(r#"{"format":"PNG","scale":2.0}"#).unwrap();
        assert_eq!(format, ExportFormat::Png { scale: 2.0 });
        assert_eq!(format.mime_type(), "image/png");
    }
}
