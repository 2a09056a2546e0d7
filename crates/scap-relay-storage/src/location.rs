//! Path building for report storage.
//!
//! Every location is `<root>/<client-identity>/<id-or-policy>/<timestamp>/`.
//! Segments come from routing parameters (request path or forward
//! receipt), so each is validated against traversal before it touches the
//! filesystem.

use std::path::{Path, PathBuf};

use crate::{StorageError, StorageResult};

/// Which storage tier a location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageRoot {
    /// Forwarded and durably stored.
    Primary,
    /// Primary write failed; retained for manual remediation.
    Failed,
    /// Forwarding failed transiently; retained for redelivery.
    Spool,
}

impl StorageRoot {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageRoot::Primary => "primary",
            StorageRoot::Failed => "failed",
            StorageRoot::Spool => "spool",
        }
    }
}

/// One on-disk container for a report's artifacts.
#[derive(Debug, Clone)]
pub struct StorageLocation {
    root: StorageRoot,
    dir: PathBuf,
}

impl StorageLocation {
    /// Build a location under `base`, validating every routing segment.
    pub fn new(
        root: StorageRoot,
        base: &Path,
        common_name: &str,
        key: &str,
        timestamp: &str,
    ) -> StorageResult<Self> {
        validate_segment(common_name)?;
        validate_segment(key)?;
        validate_segment(timestamp)?;

        Ok(StorageLocation {
            root,
            dir: base.join(common_name).join(key).join(timestamp),
        })
    }

    pub fn root(&self) -> StorageRoot {
        self.root
    }

    /// The report's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the digest-named archive inside the directory.
    pub fn artifact(&self, digest: &str) -> StorageResult<PathBuf> {
        validate_segment(digest)?;
        Ok(self.dir.join(digest))
    }
}

/// Reject anything that is not a single plain path component.
fn validate_segment(segment: &str) -> StorageResult<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0')
    {
        return Err(StorageError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}
