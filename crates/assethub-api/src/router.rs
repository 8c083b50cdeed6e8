//! Route definitions for the AssetHub HTTP server.
//!
//! The JSON API lives under `/api`; every other path falls through to the
//! static web root.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let static_files = handlers::static_files::static_router(&state.config.server.static_root);

    let router = Router::new()
        .nest("/api", api_routes())
        .merge(static_files)
        .layer(axum_middleware::from_fn(middleware::preflight::answer_options))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let router = if state.config.logging.request_log {
        router.layer(axum_middleware::from_fn(middleware::logging::request_logging))
    } else {
        router
    };

    router.with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/analyze-image",
            post(handlers::analyze::analyze_image).fallback(handlers::static_files::not_found),
        )
        .route(
            "/health",
            get(handlers::health::health).fallback(handlers::static_files::not_found),
        )
}
