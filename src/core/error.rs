// Centralized error handling for the dashboard pipeline

use crate::api::client::ServiceKind;
use crate::models::response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Errors surfaced by the resolution, orchestration and aggregation pipeline.
///
/// The `Display` text is what the dashboard shows to the teacher, so upstream
/// `error` messages are carried through verbatim in `FetchFailed`.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("No authentication token found")]
    CredentialMissing,

    #[error("{message}")]
    FetchFailed { service: ServiceKind, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PartialDataUnavailable(String),

    #[error("Malformed response from {service} service: {message}")]
    MalformedResponse { service: ServiceKind, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DashboardError {
    pub fn fetch_failed(service: ServiceKind, message: impl Into<String>) -> Self {
        DashboardError::FetchFailed {
            service,
            message: message.into(),
        }
    }

    pub fn malformed(service: ServiceKind, message: impl Into<String>) -> Self {
        DashboardError::MalformedResponse {
            service,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::CredentialMissing => StatusCode::UNAUTHORIZED,
            DashboardError::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::PartialDataUnavailable(_) => StatusCode::BAD_GATEWAY,
            DashboardError::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
