//! Core types for the scap-relay service.
//!
//! This crate holds the data model shared by every other crate: scan
//! reports and their decoded form, the unified `AppError` taxonomy, the
//! env-driven configuration, and the content-digest helper. It has no
//! I/O of its own.

pub mod config;
pub mod digest;
pub mod error;
pub mod models;

pub use config::Config;
pub use digest::content_digest;
pub use error::{AppError, ErrorMetadata, LogLevel};
