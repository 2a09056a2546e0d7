use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::digest::content_digest;

/// An inbound compliance scan report, as received from a client.
///
/// The content digest is computed exactly once from the untouched raw
/// bytes at construction time, before any forward or store attempt, and
/// is immutable for the report's lifetime.
#[derive(Debug, Clone)]
pub struct ScanReport {
    bytes: Bytes,
    digest: String,
    /// Client identity (certificate common name) established by the
    /// fronting TLS terminator.
    pub common_name: String,
    /// Policy the scan was evaluated against. Names the spool path when
    /// forwarding fails before an id is assigned.
    pub policy_id: String,
    pub submitted_at: DateTime<Utc>,
    /// Assigned by the management server on successful forward. Names the
    /// primary/failed storage path once present.
    pub report_id: Option<String>,
}

impl ScanReport {
    pub fn new(common_name: impl Into<String>, policy_id: impl Into<String>, bytes: Bytes) -> Self {
        let digest = content_digest(&bytes);
        ScanReport {
            bytes,
            digest,
            common_name: common_name.into(),
            policy_id: policy_id.into(),
            submitted_at: Utc::now(),
            report_id: None,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Submission time as unix seconds, the path-segment form.
    pub fn timestamp(&self) -> i64 {
        self.submitted_at.timestamp()
    }

    /// Record the id the management server assigned on forward success.
    pub fn assign_report_id(&mut self, id: impl Into<String>) {
        self.report_id = Some(id.into());
    }
}
