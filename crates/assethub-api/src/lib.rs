//! # assethub-api
//!
//! HTTP layer for AssetHub built on Axum.
//!
//! Serves the static web client, relays image analysis requests to the
//! vision service, and carries the middleware stack (CORS, compression,
//! tracing, request logging, body limits).

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
