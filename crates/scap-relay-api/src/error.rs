//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for
//! AppError. Handlers return `Result<impl IntoResponse, HttpAppError>`
//! and rely on the `From` conversions here so domain errors render
//! consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scap_relay_arf::ParseError;
use scap_relay_core::{AppError, ErrorMetadata, LogLevel};
use scap_relay_services::IngestError;
use scap_relay_storage::StorageError;
use serde::Serialize;

/// JSON body of every error response the relay serves.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable code, stable across releases
    pub code: String,
    /// Whether the submitting client can usefully retry
    pub recoverable: bool,
}

/// Newtype over `AppError` carrying the `IntoResponse` impl; the orphan
/// rule forbids implementing it on the core type directly.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let kind = error.error_type();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, kind, "Request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, kind, "Request failed"),
        LogLevel::Error => tracing::error!(error = %error, kind, "Request failed"),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // The relay talks to its own operators and the management server,
        // so responses carry the error chain rather than hiding it.
        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details: Some(app_error.detailed_message()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
        });

        (status, body).into_response()
    }
}

// Domain-error conversions. Each crate's error enum maps onto the
// AppError variant whose metadata carries the documented semantics.

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::FileNotFound(msg) => AppError::FileNotFound(msg),
            StorageError::StoreReport(msg) => AppError::StoreReport(msg),
            StorageError::StoreSpool(msg) => AppError::StoreSpool(msg),
            StorageError::InvalidSegment(msg) => {
                AppError::InvalidInput(format!("invalid path segment: {}", msg))
            }
            StorageError::Render(msg) => AppError::Decode(msg),
            StorageError::Io(err) => AppError::Internal(format!("IO error: {}", err)),
        };
        HttpAppError(app)
    }
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        let app = match err {
            IngestError::SpoolFailed(e) => AppError::StoreSpool(e.to_string()),
            IngestError::ForwardFailed(e) => AppError::Forward(e.to_string()),
            IngestError::PreserveFailed(e) => AppError::StoreReport(e.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<ParseError> for HttpAppError {
    fn from(err: ParseError) -> Self {
        HttpAppError(AppError::Decode(err.to_string()))
    }
}
