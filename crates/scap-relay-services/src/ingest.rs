//! The report-ingestion fallback state machine.
//!
//! `Received → Forwarding → {Stored, StoredFailed, Spooled, Fatal}`.
//! A report is lost only when two independent failures coincide: the
//! forward fails transiently AND the spool write fails. Every other
//! failure path leaves a durable copy somewhere and stays silent to the
//! submitting client.

use std::sync::Arc;

use scap_relay_core::models::ScanReport;
use scap_relay_storage::{StorageError, StorageFS, StorageLocation};
use thiserror::Error;

use crate::forwarder::{ForwardError, Forwarder};

/// Terminal states of a completed ingestion.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Forwarded and stored under the primary root.
    Stored {
        report_id: String,
        location: StorageLocation,
    },
    /// Forwarded, but the primary write failed; the report is preserved
    /// under the failed root pending manual remediation.
    StoredFailed {
        report_id: String,
        location: StorageLocation,
    },
    /// Forwarding failed transiently; the report waits in the spool for
    /// out-of-band delivery.
    Spooled { location: StorageLocation },
}

/// The `Fatal` terminal state: the only ingestion failures a client sees.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Forward failed transiently and the spool write failed too. No
    /// copy of the report exists anywhere.
    #[error("Failed to spool report: {0}")]
    SpoolFailed(StorageError),

    /// Forwarding failed outside the recognized transient set.
    #[error("Failed to forward report: {0}")]
    ForwardFailed(ForwardError),

    /// The failed-root write after a primary-store failure did not
    /// complete either; the report was not preserved.
    #[error("Failed to preserve report: {0}")]
    PreserveFailed(StorageError),
}

pub struct ReportIngestor {
    forwarder: Arc<dyn Forwarder>,
    storage: StorageFS,
}

impl ReportIngestor {
    pub fn new(forwarder: Arc<dyn Forwarder>, storage: StorageFS) -> Self {
        ReportIngestor { forwarder, storage }
    }

    /// Run one report through the state machine to a terminal state.
    pub async fn ingest(&self, mut report: ScanReport) -> Result<IngestOutcome, IngestError> {
        match self.forwarder.forward(&report).await {
            Ok(receipt) => {
                report.assign_report_id(receipt.report_id.clone());
                self.store_forwarded(report, receipt.report_id).await
            }
            Err(err) if err.is_transient() => {
                tracing::error!(
                    error = %err,
                    common_name = %report.common_name,
                    policy = %report.policy_id,
                    "Failed to forward report to the management server, saving in spool"
                );
                match self.storage.store_spool(&report).await {
                    Ok(location) => Ok(IngestOutcome::Spooled { location }),
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            common_name = %report.common_name,
                            policy = %report.policy_id,
                            "Spool write failed; report could not be preserved"
                        );
                        Err(IngestError::SpoolFailed(e))
                    }
                }
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    common_name = %report.common_name,
                    policy = %report.policy_id,
                    "Unrecoverable forwarding failure"
                );
                Err(IngestError::ForwardFailed(err))
            }
        }
    }

    async fn store_forwarded(
        &self,
        report: ScanReport,
        report_id: String,
    ) -> Result<IngestOutcome, IngestError> {
        match self.storage.store_archive(&report).await {
            Ok(location) => Ok(IngestOutcome::Stored {
                report_id,
                location,
            }),
            Err(StorageError::StoreReport(msg)) => {
                tracing::error!(
                    error = %msg,
                    common_name = %report.common_name,
                    report_id = %report_id,
                    "Failed to save report in the reports directory; saving under the failed \
                     directory instead. Please copy it back into the reports directory manually"
                );
                let location = self
                    .storage
                    .store_failed(&report)
                    .await
                    .map_err(IngestError::PreserveFailed)?;
                Ok(IngestOutcome::StoredFailed {
                    report_id,
                    location,
                })
            }
            Err(other) => Err(IngestError::PreserveFailed(other)),
        }
    }
}
