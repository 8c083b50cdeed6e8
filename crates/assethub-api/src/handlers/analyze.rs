//! Vision relay handler.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{error, info};

use assethub_vision::AnalysisResult;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/analyze-image`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Image as a `data:` URL.
    #[serde(rename = "imageData", default)]
    pub image_data: Option<String>,
}

fn analysis_failed(details: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to analyze image").with_details(details)
}

/// POST /api/analyze-image
///
/// The body is read as raw bytes so a malformed payload surfaces as an
/// analysis failure rather than an extractor rejection.
pub async fn analyze_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Some(analyzer) = state.analyzer.as_ref() else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "OpenAI API key not configured. Please add OPENAI_API_KEY to .env file",
        ));
    };

    let request: AnalyzeRequest = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "Malformed analysis request");
        analysis_failed(e.to_string())
    })?;

    let image_data = match request.image_data {
        Some(data) if !data.is_empty() => data,
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "No image data provided",
            ));
        }
    };

    info!(bytes = image_data.len(), "Relaying image analysis");
    match analyzer.analyze(&image_data).await {
        Ok(analysis) => Ok(Json(analysis)),
        Err(e) => {
            error!(kind = %e.kind, error = %e.message, "Image analysis failed");
            Err(analysis_failed(e.message))
        }
    }
}
