//! HTTP contract of the static server and the vision relay.

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use assethub_vision::{AnalysisResult, ImageAnalyzer};

use helpers::{FakeAnalyzer, TestApp, assert_status, body_json, body_text};

fn logo_analysis() -> AnalysisResult {
    AnalysisResult {
        category: "logo".to_string(),
        tags: vec!["brand".to_string(), "mark".to_string(), "blue".to_string()],
        colors: vec!["#0044ff".to_string()],
        description: "A blue logo.".to_string(),
    }
}

#[tokio::test]
async fn test_root_serves_index_without_caching() {
    let app = TestApp::new(None);
    let response = app.get("/").await;

    assert_status(&response, StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert_eq!(body_text(response).await, "<h1>AssetHub</h1>");

    let script = app.get("/app.js").await;
    assert_status(&script, StatusCode::OK);
    assert!(
        script.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .contains("javascript")
    );
}

#[tokio::test]
async fn test_missing_file_is_html_404() {
    let app = TestApp::new(None);
    let response = app.get("/missing.png").await;

    assert_status(&response, StatusCode::NOT_FOUND);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert_eq!(body_text(response).await, "<h1>404 - File Not Found</h1>");
}

#[tokio::test]
async fn test_wrong_method_on_api_route_is_html_404() {
    let app = TestApp::new(Some(Arc::new(FakeAnalyzer::failing())));
    let response = app.get("/api/analyze-image").await;

    assert_status(&response, StatusCode::NOT_FOUND);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert_eq!(body_text(response).await, "<h1>404 - File Not Found</h1>");

    let response = app.post_json("/api/health", "{}").await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_options_answers_ok_with_cors() {
    let app = TestApp::new(None);
    let response = app
        .request(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/analyze-image")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let bare = app
        .request(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_status(&bare, StatusCode::OK);
}

#[tokio::test]
async fn test_analyze_without_key_is_500() {
    let app = TestApp::new(None);
    let response = app
        .post_json("/api/analyze-image", r#"{"imageData":"data:image/png;base64,AA=="}"#)
        .await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "OpenAI API key not configured. Please add OPENAI_API_KEY to .env file" })
    );
}

#[tokio::test]
async fn test_analyze_without_image_is_400() {
    let analyzer = Arc::new(FakeAnalyzer::replying(logo_analysis()));
    let app = TestApp::new(Some(analyzer.clone() as Arc<dyn ImageAnalyzer>));

    let response = app.post_json("/api/analyze-image", "{}").await;
    assert_status(&response, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "No image data provided" }));
    assert!(analyzer.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_relays_result() {
    let analyzer = Arc::new(FakeAnalyzer::replying(logo_analysis()));
    let app = TestApp::new(Some(analyzer.clone() as Arc<dyn ImageAnalyzer>));

    let response = app
        .post_json("/api/analyze-image", r#"{"imageData":"data:image/png;base64,iVBOR"}"#)
        .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "category": "logo",
            "tags": ["brand", "mark", "blue"],
            "colors": ["#0044ff"],
            "description": "A blue logo."
        })
    );
    assert_eq!(
        analyzer.seen.lock().unwrap().as_slice(),
        ["data:image/png;base64,iVBOR"]
    );
}

#[tokio::test]
async fn test_upstream_failure_carries_details() {
    let app = TestApp::new(Some(Arc::new(FakeAnalyzer::failing())));

    let response = app
        .post_json("/api/analyze-image", r#"{"imageData":"data:image/png;base64,AA=="}"#)
        .await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({
            "error": "Failed to analyze image",
            "details": "Vision API returned 429: rate limited"
        })
    );
}

#[tokio::test]
async fn test_malformed_body_is_analysis_failure() {
    let app = TestApp::new(Some(Arc::new(FakeAnalyzer::failing())));

    let response = app.post_json("/api/analyze-image", "{not json").await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to analyze image");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_health_reports_vision_state() {
    let app = TestApp::new(None);
    let body = body_json(app.get("/api/health").await).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["vision"], false);
}
