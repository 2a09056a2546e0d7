//! Error types module
//!
//! This module provides the core error types used throughout the relay.
//! All errors are unified under the `AppError` enum which can represent
//! storage, forwarding, decoding, and authentication failures.

use std::io;

/// Severity an error is logged at when it reaches the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected client mistakes, e.g. invalid route parameters
    Debug,
    /// Recovered conditions: failed-root fallback, spool fallback
    Warn,
    /// Unexpected failures
    Error,
}

/// How an error presents itself at the service boundary.
///
/// Each error knows its own HTTP status, wire code, and logging
/// treatment, so callers never re-derive them from variant matching.
pub trait ErrorMetadata {
    /// HTTP status code to answer with
    fn http_status_code(&self) -> u16;

    /// Machine-readable code (e.g., "STORE_SPOOL_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the operation can succeed
    fn is_recoverable(&self) -> bool;

    /// Message for the response body (may differ from the internal one)
    fn client_message(&self) -> String;

    /// Severity at which the error is logged
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client identity could not be established; ingestion never starts.
    #[error("Client authentication failed: {0}")]
    Authentication(String),

    /// Primary persistence failed. Recovered via the failed root when the
    /// ingestor drives the fallback; fatal when it escapes that path.
    #[error("Failed to store report: {0}")]
    StoreReport(String),

    /// Spool persistence failed. Fatal: no durable copy of the report
    /// remains anywhere.
    #[error("Failed to spool report: {0}")]
    StoreSpool(String),

    /// Forwarding to the management server failed outside the recognized
    /// transient set.
    #[error("Failed to forward report: {0}")]
    Forward(String),

    /// Requested artifact does not exist under the resolved path.
    #[error("Could not find requested file, {0}")]
    FileNotFound(String),

    /// ARF archive could not be decoded.
    #[error("Failed to decode report archive: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
/// Reduces duplication in the ErrorMetadata impl; client_message stays per-variant.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Authentication(_) => (403, "AUTHENTICATION_FAILED", false, LogLevel::Warn),
        AppError::StoreReport(_) => (500, "STORE_REPORT_ERROR", true, LogLevel::Error),
        AppError::StoreSpool(_) => (500, "STORE_SPOOL_ERROR", false, LogLevel::Error),
        AppError::Forward(_) => (500, "FORWARD_ERROR", true, LogLevel::Error),
        // Missing artifacts are treated as a server fault, not a plain 404:
        // the route parameters came from the management server's own records.
        AppError::FileNotFound(_) => (500, "FILE_NOT_FOUND", false, LogLevel::Warn),
        AppError::Decode(_) => (500, "DECODE_ERROR", false, LogLevel::Error),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Variant name, used as a structured logging field.
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Authentication(_) => "Authentication",
            AppError::StoreReport(_) => "StoreReport",
            AppError::StoreSpool(_) => "StoreSpool",
            AppError::Forward(_) => "Forward",
            AppError::FileNotFound(_) => "FileNotFound",
            AppError::Decode(_) => "Decode",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Render the error with its source chain, capped at five causes.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut cause = self.source();

        for depth in 0.. {
            match cause {
                Some(err) if depth < 5 => {
                    details.push_str(&format!("\n  Caused by: {}", err));
                    cause = err.source();
                }
                Some(_) => {
                    details.push_str("\n  ... (truncated)");
                    break;
                }
                None => break,
            }
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Authentication(ref msg) => {
                format!("Client authentication failed: {}", msg)
            }
            AppError::StoreReport(_) => "Failed to store report".to_string(),
            AppError::StoreSpool(_) => "Failed to spool report".to_string(),
            AppError::Forward(_) => "Failed to forward report to the management server".to_string(),
            AppError::FileNotFound(ref msg) => format!("Could not find requested file, {}", msg),
            AppError::Decode(_) => "Failed to decode report archive".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_authentication() {
        let err = AppError::Authentication("no certificate".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "AUTHENTICATION_FAILED");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(err.client_message().contains("no certificate"));
    }

    #[test]
    fn test_error_metadata_store_spool_is_fatal() {
        let err = AppError::StoreSpool("disk full".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORE_SPOOL_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_file_not_found_is_server_fault() {
        let err = AppError::FileNotFound("no artifact for digest".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
        assert!(err.client_message().contains("no artifact for digest"));
    }

    #[test]
    fn test_internal_hides_details_from_client() {
        let err = AppError::Internal("connection pool exhausted".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("root cause");
        let err = AppError::InternalWithSource {
            message: "wrapper".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by: root cause"));
    }
}
