//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use assethub_core::config::AppConfig;
use assethub_vision::ImageAnalyzer;

/// Shared handler state.
///
/// Cloned into every request; all fields are `Arc`-wrapped.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Vision relay, absent when no API key is configured
    pub analyzer: Option<Arc<dyn ImageAnalyzer>>,
}

impl AppState {
    /// Build state from configuration and an optional analyzer.
    pub fn new(config: AppConfig, analyzer: Option<Arc<dyn ImageAnalyzer>>) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }

    /// Whether image analysis is available.
    pub fn vision_enabled(&self) -> bool {
        self.analyzer.is_some()
    }
}
