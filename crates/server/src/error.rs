//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`;
//! every failure body is the same JSON envelope the browser client expects:
//! `{"success": false, "error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::archive::ArchiveError;
use crate::services::dns::DnsError;
use crate::services::generation::GenerationError;
use crate::services::hosting::{GitHubError, NetlifyError};
use crate::services::payment::StripeError;
use crate::services::registrar::RegistrarError;

/// Application-level error type for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registrar API operation failed.
    #[error("Registrar error: {0}")]
    Registrar(#[from] RegistrarError),

    /// GitHub API operation failed.
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Netlify API operation failed.
    #[error("Netlify error: {0}")]
    Netlify(#[from] NetlifyError),

    /// Text generation failed.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Payment provider operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] StripeError),

    /// DNS lookup failed.
    #[error("DNS error: {0}")]
    Dns(#[from] DnsError),

    /// Site archive could not be built.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A deployment target is not configured on this server.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error envelope returned for every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side and upstream errors to Sentry
        if matches!(
            self,
            Self::Internal(_)
                | Self::Archive(_)
                | Self::Registrar(_)
                | Self::GitHub(_)
                | Self::Netlify(_)
                | Self::Generation(_)
                | Self::Payment(_)
                | Self::Dns(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Internal(_) | Self::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Registrar(_)
            | Self::GitHub(_)
            | Self::Netlify(_)
            | Self::Generation(_)
            | Self::Payment(_)
            | Self::Dns(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Upstream provider errors carry the provider's status and message
        // so the client can show something actionable; internal details stay
        // hidden.
        let message = match &self {
            Self::Internal(_) | Self::Archive(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("session abc".to_string());
        assert_eq!(err.to_string(), "Not found: session abc");

        let err = AppError::BadRequest("invalid domain".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid domain");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotConfigured("netlify".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Registrar(RegistrarError::Api {
                status: 500,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("sqlite on fire".to_string());
        let response = err.into_response();
        // Body is the generic envelope; the detail string must not leak.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
