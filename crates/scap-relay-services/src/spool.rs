//! Out-of-band redelivery of spooled reports.
//!
//! Reports land in the spool when forwarding failed transiently. A drain
//! pass walks the spool in deterministic order, re-forwards each report,
//! and promotes delivered archives into the primary root under their
//! newly assigned id.

use std::sync::Arc;

use chrono::DateTime;
use scap_relay_core::models::ScanReport;
use scap_relay_storage::{SpooledEntry, StorageError, StorageFS};

use crate::forwarder::Forwarder;

/// Result of one drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    /// Redelivered, promoted to the primary root, removed from the spool.
    pub delivered: usize,
    /// Left in place: the upstream is still unreachable.
    pub remaining: usize,
    /// Left in place: rejected upstream or corrupt on disk.
    pub failed: usize,
}

pub struct SpoolDrain {
    forwarder: Arc<dyn Forwarder>,
    storage: StorageFS,
}

impl SpoolDrain {
    pub fn new(forwarder: Arc<dyn Forwarder>, storage: StorageFS) -> Self {
        SpoolDrain { forwarder, storage }
    }

    /// Attempt redelivery of every spooled report. Stops early when the
    /// upstream proves unreachable; the rest of the spool waits for the
    /// next pass.
    pub async fn drain(&self) -> Result<DrainSummary, StorageError> {
        let entries = self.storage.list_spooled().await?;
        let total = entries.len();
        let mut summary = DrainSummary::default();

        for (index, entry) in entries.iter().enumerate() {
            let data = self.storage.read_spooled(entry).await?;

            let mut report = ScanReport::new(
                entry.common_name.clone(),
                entry.policy_id.clone(),
                data.into(),
            );
            if report.digest() != entry.digest {
                tracing::warn!(
                    expected = %entry.digest,
                    actual = %report.digest(),
                    "Spooled archive digest mismatch, leaving in place"
                );
                summary.failed += 1;
                continue;
            }
            restore_submission_time(&mut report, entry);

            match self.forwarder.forward(&report).await {
                Ok(receipt) => {
                    report.assign_report_id(receipt.report_id.clone());
                    self.promote(&report, entry).await?;
                    tracing::info!(
                        common_name = %entry.common_name,
                        policy = %entry.policy_id,
                        report_id = %receipt.report_id,
                        "Redelivered spooled report"
                    );
                    summary.delivered += 1;
                }
                Err(err) if err.is_transient() => {
                    tracing::warn!(
                        error = %err,
                        "Management server still unreachable, stopping drain pass"
                    );
                    summary.remaining = total - index;
                    break;
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        common_name = %entry.common_name,
                        policy = %entry.policy_id,
                        "Spooled report rejected upstream, leaving in place"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Store the delivered report under the primary root and drop the
    /// spool entry. Falls back to the failed root like live ingestion.
    async fn promote(&self, report: &ScanReport, entry: &SpooledEntry) -> Result<(), StorageError> {
        match self.storage.store_archive(report).await {
            Ok(_) => {}
            Err(StorageError::StoreReport(msg)) => {
                tracing::error!(
                    error = %msg,
                    "Failed to save redelivered report in the reports directory; saving under \
                     the failed directory instead"
                );
                self.storage.store_failed(report).await?;
            }
            Err(other) => return Err(other),
        }
        self.storage.remove_spooled(entry).await
    }
}

/// Spool paths carry the original submission time; keep it on the
/// redelivered report so the primary path matches the original date.
fn restore_submission_time(report: &mut ScanReport, entry: &SpooledEntry) {
    if let Some(ts) = entry
        .timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        report.submitted_at = ts;
    }
}
