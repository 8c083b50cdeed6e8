//! Shared helpers for router tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use assethub_api::{AppState, build_router};
use assethub_core::config::AppConfig;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_vision::{AnalysisResult, ImageAnalyzer};

/// Analyzer that answers from a canned result and records its inputs.
#[derive(Debug, Default)]
pub struct FakeAnalyzer {
    pub reply: Option<AnalysisResult>,
    pub seen: Mutex<Vec<String>>,
}

impl FakeAnalyzer {
    pub fn replying(reply: AnalysisResult) -> Self {
        Self {
            reply: Some(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageAnalyzer for FakeAnalyzer {
    async fn analyze(&self, image_data: &str) -> AppResult<AnalysisResult> {
        self.seen.lock().unwrap().push(image_data.to_string());
        self.reply
            .clone()
            .ok_or_else(|| AppError::external("Vision API returned 429: rate limited"))
    }
}

/// Test application context
pub struct TestApp {
    pub router: Router,
    /// Static web root, removed on drop
    pub root: TempDir,
}

impl TestApp {
    /// A server whose web root holds an `index.html` and `app.js`.
    pub fn new(analyzer: Option<Arc<dyn ImageAnalyzer>>) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::write(root.path().join("index.html"), "<h1>AssetHub</h1>").expect("index");
        std::fs::write(root.path().join("app.js"), "console.log('ready');").expect("script");

        let mut config = AppConfig::default();
        config.server.static_root = root.path().to_string_lossy().into_owned();
        config.server.max_body_bytes = 64 * 1024;

        let router = build_router(AppState::new(config, analyzer));
        Self { router, root }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("infallible")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, path: &str, body: &str) -> Response {
        self.request(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

pub fn assert_status(response: &Response, status: StatusCode) {
    assert_eq!(response.status(), status, "unexpected status");
}
