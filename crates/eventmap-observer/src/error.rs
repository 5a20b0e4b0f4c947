//! Error types for the map API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eventmap_core::{CreateError, ViewCommand};
use tokio::sync::{mpsc, oneshot};

/// Errors that can occur in the map API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// No frame has been rendered yet.
    #[error("view not ready")]
    NotReady,

    /// The map session has stopped and no longer takes commands.
    #[error("map session is not running")]
    SessionClosed,

    /// The request was well-formed JSON but semantically invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// A backing service failed.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<CreateError> for ObserverError {
    fn from(e: CreateError) -> Self {
        match e {
            CreateError::Invalid(v) => Self::InvalidInput(v.to_string()),
            CreateError::Store(s) => Self::Upstream(s.to_string()),
            CreateError::SessionClosed => Self::SessionClosed,
        }
    }
}

impl From<mpsc::error::SendError<ViewCommand>> for ObserverError {
    fn from(_: mpsc::error::SendError<ViewCommand>) -> Self {
        Self::SessionClosed
    }
}

impl From<oneshot::error::RecvError> for ObserverError {
    fn from(_: oneshot::error::RecvError) -> Self {
        Self::SessionClosed
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotReady | Self::SessionClosed => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidInput(_) | Self::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
