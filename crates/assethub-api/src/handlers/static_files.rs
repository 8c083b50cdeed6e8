//! Static web root.

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Html;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

/// Body returned for paths with no file behind them.
pub const NOT_FOUND_BODY: &str = "<h1>404 - File Not Found</h1>";

/// The HTML 404 page, also used for API paths hit with the wrong method.
pub async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY))
}

/// Fallback router serving files under `root`.
///
/// `/` and other directories resolve to their `index.html`. Every response,
/// including the 404 page, carries `Cache-Control: no-cache`.
pub fn static_router<S>(root: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let files = ServeDir::new(root)
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .fallback_service(files)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
}
