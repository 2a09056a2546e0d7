//! On-disk persistence for scan report archives.
//!
//! Reports live under one of three roots: `primary` (forwarded and
//! stored), `failed` (primary write failed, awaiting manual remediation)
//! and `spool` (forwarding failed transiently, awaiting out-of-band
//! delivery). A report at rest occupies exactly one location.
//!
//! Layout: `<root>/<client-identity>/<id-or-policy>/<timestamp>/` with
//! the raw archive stored digest-named inside the directory. Placement is
//! derived purely from routing parameters; the digest is a read-side
//! content-addressing key only.

mod fs;
mod location;

pub use fs::{SpooledEntry, StorageFS};
pub use location::{StorageLocation, StorageRoot};

use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Primary or failed-root write could not complete.
    #[error("Failed to store report: {0}")]
    StoreReport(String),

    /// Spool write could not complete. The last line of defense.
    #[error("Failed to spool report: {0}")]
    StoreSpool(String),

    /// No artifact matches the resolved path. Raised on retrieval and on
    /// deletion of an already-absent artifact alike.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A routing parameter would escape the storage root.
    #[error("Invalid path segment: {0}")]
    InvalidSegment(String),

    /// Stored archive could not be rendered into the requested view.
    #[error("Failed to render report: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
