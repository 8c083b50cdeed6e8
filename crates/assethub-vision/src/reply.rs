//! Parsing of the model's reply text.

use serde::{Deserialize, Serialize};

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;

/// Tags suggested for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One of logo, icon, photo, illustration, screenshot, diagram, other.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Dominant colors as hex codes.
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub description: String,
}

fn fenced<'a>(content: &'a str, opener: &str) -> Option<&'a str> {
    let start = content.find(opener)? + opener.len();
    let rest = &content[start..];
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let end = rest.find("```")?;
    let body = &rest[..end];
    Some(body.strip_suffix('\n').unwrap_or(body))
}

/// The JSON payload inside a reply.
///
/// Prefers a ```` ```json ```` fence, then a bare ```` ``` ```` fence, and
/// falls back to the whole text.
pub fn extract_json(content: &str) -> &str {
    fenced(content, "```json")
        .or_else(|| fenced(content, "```"))
        .unwrap_or(content)
}

/// Parse a reply into an [`AnalysisResult`].
///
/// When the fenced payload does not parse, the whole text is tried before
/// giving up.
pub fn parse_analysis(content: &str) -> AppResult<AnalysisResult> {
    serde_json::from_str(extract_json(content))
        .or_else(|_| serde_json::from_str(content))
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Vision reply is not valid JSON: {e}"),
                e,
            )
        })
}
