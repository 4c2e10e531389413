//! Surface-level error kinds and their HTTP mapping.
//!
//! `spec.md` §7 names four kinds: `InvalidArgument`, `NotFound`,
//! `Unavailable`, `Internal`. Every handler collapses its internal errors
//! (registry, scheduler, signing) down to one of these before it reaches
//! the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coordinator_registry::RegistryError;
use coordinator_scheduler::SchedulerError;
use coordinator_signing::SigningError;
use serde::Serialize;
use tracing::error;

/// A surface-facing error, already collapsed to one of the four wire kinds.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// A required field was missing or empty.
    #[error("{0}")]
    InvalidArgument(String),
    /// The referenced agent id is unknown.
    #[error("{0}")]
    NotFound(String),
    /// Scheduling found no agent; retry is appropriate.
    #[error("{0}")]
    Unavailable(String),
    /// Signing failed or an invariant was broken; not retriable.
    #[error("{0}")]
    Internal(String),
}

impl SurfaceError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    message: String,
}

impl IntoResponse for SurfaceError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref reason) = self {
            error!(reason, "internal surface error");
        }
        let status = self.status();
        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("error").to_string(),
            code: self.code(),
            message: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<RegistryError> for SurfaceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::BadRequest { reason } => Self::InvalidArgument(reason.to_string()),
            RegistryError::NotFound { agent_id } => {
                Self::NotFound(format!("unknown agent: {agent_id}"))
            }
        }
    }
}

impl From<SchedulerError> for SurfaceError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::NoAgentsAvailable { model } => {
                Self::Unavailable(format!("no agent available for model {model}"))
            }
        }
    }
}

impl From<SigningError> for SurfaceError {
    fn from(err: SigningError) -> Self {
        Self::Internal(err.to_string())
    }
}
