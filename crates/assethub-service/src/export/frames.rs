//! Selection previews and frame export.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_entity::data_url;

use super::{Constraint, ExportFormat, ExportSettings, ExportableNode};
use crate::notify::{Notifier, Toast};
use crate::upload::CandidateFile;

/// Width of selection thumbnails, in pixels.
pub const THUMBNAIL_WIDTH: u32 = 100;

/// A selected frame as shown before export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePreview {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// PNG thumbnail bytes.
    pub thumbnail: Vec<u8>,
}

/// Previews of the current selection, or why there are none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPreview {
    pub frames: Vec<FramePreview>,
    pub error: Option<String>,
}

/// One exported frame, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFrame {
    pub id: String,
    /// Node name plus the format extension.
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    /// Inline `data:` URL.
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl ExportedFrame {
    /// Decode the frame back into an upload candidate.
    pub fn into_candidate(self) -> AppResult<CandidateFile> {
        let decoded = data_url::parse(&self.data)?;
        Ok(CandidateFile::new(self.name, self.mime_type, decoded.bytes))
    }
}

fn pixels(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Render small thumbnails of the exportable nodes in a selection.
///
/// Nodes whose thumbnail fails to render are left out.
pub async fn preview_selection(nodes: &[Arc<dyn ExportableNode>]) -> SelectionPreview {
    if nodes.is_empty() {
        return SelectionPreview {
            frames: Vec::new(),
            error: Some("No frames selected. Please select frames in Figma.".to_string()),
        };
    }

    let settings = ExportSettings::Png {
        constraint: Constraint::Width(THUMBNAIL_WIDTH),
    };
    let mut frames = Vec::new();
    for node in nodes.iter().filter(|n| n.can_export()) {
        match node.export(&settings).await {
            Ok(thumbnail) => frames.push(FramePreview {
                id: node.id().to_string(),
                name: node.name().to_string(),
                width: pixels(node.width()),
                height: pixels(node.height()),
                thumbnail,
            }),
            Err(e) => warn!(node = node.id(), error = %e, "Thumbnail failed"),
        }
    }

    let error = frames
        .is_empty()
        .then(|| "Selected items cannot be exported.".to_string());
    SelectionPreview { frames, error }
}

/// Export every exportable node in the selection.
///
/// A node that fails to render raises "Error exporting {name}" and the
/// rest of the batch continues.
pub async fn export_frames(
    nodes: &[Arc<dyn ExportableNode>],
    format: ExportFormat,
    notifier: &dyn Notifier,
) -> AppResult<Vec<ExportedFrame>> {
    if nodes.is_empty() {
        return Err(AppError::validation("No frames selected"));
    }

    let settings = format.settings();
    let scale = format.scale();
    let mut exported = Vec::with_capacity(nodes.len());
    for node in nodes.iter().filter(|n| n.can_export()) {
        match node.export(&settings).await {
            Ok(bytes) => exported.push(ExportedFrame {
                id: node.id().to_string(),
                name: format!("{}.{}", node.name(), format.extension()),
                mime_type: format.mime_type().to_string(),
                size: bytes.len() as u64,
                data: data_url::encode(format.mime_type(), &bytes),
                width: pixels(node.width() * scale),
                height: pixels(node.height() * scale),
            }),
            Err(e) => {
                error!(node = node.id(), name = node.name(), error = %e, "Export failed");
                notifier.notify(Toast::error(format!("Error exporting {}", node.name())));
            }
        }
    }
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::notify::RecordingNotifier;

    #[derive(Debug)]
    struct Frame {
        id: &'static str,
        name: &'static str,
        exportable: bool,
        broken: bool,
    }

    #[async_trait]
    impl ExportableNode for Frame {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            self.name
        }

        fn width(&self) -> f64 {
            120.4
        }

        fn height(&self) -> f64 {
            80.6
        }

        fn can_export(&self) -> bool {
            self.exportable
        }

        async fn export(&self, settings: &ExportSettings) -> AppResult<Vec<u8>> {
            if self.broken {
                return Err(AppError::external("renderer crashed"));
            }
            Ok(match settings {
                ExportSettings::Svg { .. } => b"<svg/>".to_vec(),
                ExportSettings::Png { .. } => b"\x89PNG".to_vec(),
            })
        }
    }

    fn node(id: &'static str, exportable: bool, broken: bool) -> Arc<dyn ExportableNode> {
        Arc::new(Frame {
            id,
            name: id,
            exportable,
            broken,
        })
    }

    #[tokio::test]
    async fn test_empty_selection_messages() {
        let preview = preview_selection(&[]).await;
        assert_eq!(
            preview.error.as_deref(),
            Some("No frames selected. Please select frames in Figma.")
        );

        let preview = preview_selection(&[node("Group", false, false)]).await;
        assert_eq!(preview.error.as_deref(), Some("Selected items cannot be exported."));

        let notifier = RecordingNotifier::new();
        let err = export_frames(&[], ExportFormat::Svg, &notifier).await.unwrap_err();
        assert_eq!(err.message, "No frames selected");
    }

    #[tokio::test]
    async fn test_png_export_scales_dimensions() {
        let notifier = RecordingNotifier::new();
        let frames = export_frames(
            &[node("Hero", true, false)],
            ExportFormat::Png { scale: 2.0 },
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name, "Hero.png");
        assert_eq!((frames[0].width, frames[0].height), (241, 161));
        assert_eq!(frames[0].size, 4);
        assert!(frames[0].data.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_failed_node_does_not_abort_batch() {
        let notifier = RecordingNotifier::new();
        let frames = export_frames(
            &[node("Broken", true, true), node("Icon", true, false)],
            ExportFormat::Svg,
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!((frames[0].width, frames[0].height), (120, 81));
        assert_eq!(notifier.messages(), ["Error exporting Broken"]);

        let candidate = frames[0].clone().into_candidate().unwrap();
        assert_eq!(candidate.name, "Icon.svg");
        assert_eq!(candidate.mime_type, "image/svg+xml");
        assert_eq!(candidate.bytes, b"<svg/>");
    }
}
