//! # assethub-vision
//!
//! Relay client for image tagging. Sends an image data URL with a fixed
//! prompt to an OpenAI-compatible chat-completions endpoint and parses the
//! model's JSON reply into an [`AnalysisResult`].

pub mod client;
pub mod reply;

use async_trait::async_trait;

use assethub_core::result::AppResult;

pub use client::{ANALYSIS_PROMPT, VisionClient};
pub use reply::{AnalysisResult, extract_json, parse_analysis};

/// Anything that can tag an image given as a `data:` URL.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync + std::fmt::Debug {
    /// Analyze one image.
    async fn analyze(&self, image_data: &str) -> AppResult<AnalysisResult>;
}
