//! HTTP handlers for the relay endpoints
//!
//! The surface is deliberately tiny: a liveness body on `/`, the send
//! endpoint on `POST /send`, and a 404 for everything else. Auth failures
//! answer exactly like a missing route so the endpoint's existence is not
//! leaked.

use crate::domain::SendRequest;
use crate::server::AppState;
use axum::{
    body,
    extract::{Request, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-pigeon-secret";

/// Request bodies above this are rejected outright.
const BODY_LIMIT: usize = 1024 * 1024;

/// Liveness endpoint; any method, no auth.
pub async fn index() -> impl IntoResponse {
    "humor"
}

/// Fallback for unknown methods and paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

/// `/send`: auth gate, JSON parse, send flow, outcome mapping.
///
/// Registered for every method so a non-POST gets the same "not found"
/// answer as an unknown path.
pub async fn send(State(state): State<AppState>, request: Request) -> Response {
    if request.method() != Method::POST {
        return not_found().await.into_response();
    }

    // Auth gate, checked before the body is read.
    if !authorized(&request, &state.config.secret) {
        warn!("rejected /send: bad secret or content type");
        return (StatusCode::NOT_FOUND, "invalid").into_response();
    }

    let bytes = match body::to_bytes(request.into_body(), BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("failed to read /send body: {e}");
            return (StatusCode::BAD_REQUEST, "error").into_response();
        }
    };

    // An unparsable body yields a structured 400 rather than faulting the
    // exchange.
    let send_request: SendRequest = match serde_json::from_slice(&bytes) {
        Ok(request) => request,
        Err(e) => {
            warn!("unparsable /send body: {e}");
            return (StatusCode::BAD_REQUEST, "error").into_response();
        }
    };

    match state.mailer.send(&send_request).await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        // SendError's IntoResponse collapses every failure to 200 "error".
        Err(err) => err.into_response(),
    }
}

/// Shared secret matches and the declared content type is JSON.
fn authorized(request: &Request, secret: &str) -> bool {
    let secret_ok = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == secret)
        .unwrap_or(false);

    let json_ok = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("application/json")
        })
        .unwrap_or(false);

    secret_ok && json_ok
}
