//! reqwest client for the chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use assethub_core::config::VisionConfig;
use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;

use crate::ImageAnalyzer;
use crate::reply::{AnalysisResult, parse_analysis};

/// Instruction sent alongside every image.
pub const ANALYSIS_PROMPT: &str = "Analyze this image and provide:
1. Category (choose ONE): logo, icon, photo, illustration, screenshot, diagram, other
2. Tags (3-8 relevant keywords)
3. Colors (3-5 dominant colors)
4. Description (brief, 1 sentence)

Respond ONLY with valid JSON in this exact format:
{
  \"category\": \"logo\",
  \"tags\": [\"tag1\", \"tag2\", \"tag3\"],
  \"colors\": [\"#hexcode1\", \"#hexcode2\"],
  \"description\": \"Brief description\"
}";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn request_failed(err: reqwest::Error) -> AppError {
    let message = if err.is_timeout() {
        "Vision request timed out".to_string()
    } else {
        format!("Vision request failed: {err}")
    };
    AppError::with_source(ErrorKind::ExternalService, message, err)
}

/// Vision relay client.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl VisionClient {
    /// Build a client from configuration.
    ///
    /// Fails with a configuration error when no API key is set.
    pub fn new(config: &VisionConfig) -> AppResult<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            AppError::configuration(
                "OpenAI API key not configured. Please add OPENAI_API_KEY to .env file",
            )
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, image_data: &str) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: ANALYSIS_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_data },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external(format!(
                "Vision API returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let reply: ChatResponse = response.json().await.map_err(request_failed)?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::external("Vision reply contained no message"))
    }
}

#[async_trait]
impl ImageAnalyzer for VisionClient {
    async fn analyze(&self, image_data: &str) -> AppResult<AnalysisResult> {
        info!(model = %self.model, bytes = image_data.len(), "Analyzing image");
        let content = self.complete(image_data).await?;
        debug!(reply = %content, "Vision reply received");

        let analysis = parse_analysis(&content)?;
        info!(category = %analysis.category, tags = analysis.tags.len(), "Analysis complete");
        Ok(analysis)
    }
}
