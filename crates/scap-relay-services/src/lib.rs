//! Report forwarding and the ingestion fallback pipeline.
//!
//! The ingestor is the only caller that decides what a storage or
//! forwarding failure *means*: one recognized transient class falls back
//! to the spool, one storage class falls back to the failed root, and
//! only a genuine double failure surfaces to the submitting client.

pub mod forwarder;
pub mod ingest;
pub mod spool;

pub use forwarder::{ForwardError, ForwardReceipt, Forwarder, UpstreamForwarder};
pub use ingest::{IngestError, IngestOutcome, ReportIngestor};
pub use spool::{DrainSummary, SpoolDrain};
