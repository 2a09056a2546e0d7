//! ARF archive decoding.
//!
//! Turns a raw ARF bundle (optionally bzip2/gzip compressed) into a
//! [`ParsedReport`](scap_relay_core::models::ParsedReport): the ordered
//! log of evaluated rules joined with their benchmark definitions, plus
//! aggregate pass/fail/other metrics. All decode state is owned by the
//! decoding call and released on every exit path; there is no global
//! library setup.

pub mod container;
pub mod html;
pub mod parser;
pub mod sanitize;
pub mod xccdf;

pub use html::render_html;
pub use parser::decode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Missing element: {0}")]
    MissingElement(&'static str),
}

pub type ParseResult<T> = Result<T, ParseError>;
