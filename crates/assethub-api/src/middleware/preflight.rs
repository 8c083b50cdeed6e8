//! Bare `OPTIONS` handling.

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Answer every `OPTIONS` request with an empty 200.
///
/// The CORS layer already answers real preflights; this covers requests
/// without an `Origin` header, which would otherwise reach the routes and
/// come back 405.
pub async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}
