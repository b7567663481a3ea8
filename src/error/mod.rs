//! Unified error handling for the mail relay

use crate::mail::templates::RenderError;
use crate::mail::transport::TransportError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, SendError>;

/// Everything that can go wrong between a parsed request and a completed
/// dispatch attempt.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("title is required")]
    MissingTitle,

    #[error("content is required")]
    MissingContent,

    #[error("invalid headers: {0}")]
    Headers(String),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("no mail services configured")]
    NoServices,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl IntoResponse for SendError {
    /// The HTTP contract does not use the status code as an error channel:
    /// every business failure collapses to a `200 "error"` body. The
    /// specific error only reaches the logs.
    fn into_response(self) -> Response {
        tracing::warn!("send failed: {}", self);
        (StatusCode::OK, "error").into_response()
    }
}
