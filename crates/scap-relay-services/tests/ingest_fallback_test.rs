//! Fallback correctness for the ingestion state machine.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use scap_relay_core::models::ScanReport;
use scap_relay_services::{
    DrainSummary, ForwardError, ForwardReceipt, Forwarder, IngestError, IngestOutcome,
    ReportIngestor, SpoolDrain,
};
use scap_relay_storage::StorageFS;
use tempfile::tempdir;

enum Script {
    Assign(&'static str),
    Transient,
    Reject,
}

struct ScriptedForwarder(Script);

#[async_trait]
impl Forwarder for ScriptedForwarder {
    async fn forward(&self, _report: &ScanReport) -> Result<ForwardReceipt, ForwardError> {
        match self.0 {
            Script::Assign(id) => Ok(ForwardReceipt {
                report_id: id.to_string(),
            }),
            Script::Transient => Err(ForwardError::Connect("connection refused".to_string())),
            Script::Reject => Err(ForwardError::Rejected { status: 422 }),
        }
    }
}

fn sample_report() -> ScanReport {
    ScanReport::new("client.example.com", "7", Bytes::from_static(b"<arf/>"))
}

fn archives_under(root: &Path) -> Vec<std::path::PathBuf> {
    let mut found = Vec::new();
    if !root.exists() {
        return found;
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            if entry.file_type().unwrap().is_dir() {
                stack.push(entry.path());
            } else {
                found.push(entry.path());
            }
        }
    }
    found
}

#[tokio::test]
async fn test_forward_success_stores_under_primary() {
    let dir = tempdir().unwrap();
    let storage = StorageFS::new(
        dir.path().join("reports"),
        dir.path().join("failed"),
        dir.path().join("spool"),
    );
    let ingestor = ReportIngestor::new(
        Arc::new(ScriptedForwarder(Script::Assign("42"))),
        storage,
    );

    let outcome = ingestor.ingest(sample_report()).await.unwrap();

    match outcome {
        IngestOutcome::Stored { report_id, .. } => assert_eq!(report_id, "42"),
        other => panic!("expected Stored, got {:?}", other),
    }

    let stored = archives_under(&dir.path().join("reports"));
    assert_eq!(stored.len(), 1);
    assert!(stored[0].to_string_lossy().contains("/client.example.com/42/"));
    assert!(archives_under(&dir.path().join("failed")).is_empty());
    assert!(archives_under(&dir.path().join("spool")).is_empty());
}

#[tokio::test]
async fn test_primary_store_failure_falls_back_to_failed_root() {
    let dir = tempdir().unwrap();
    // A file where the primary root should be makes every primary write fail.
    std::fs::write(dir.path().join("reports"), b"not a directory").unwrap();

    let storage = StorageFS::new(
        dir.path().join("reports"),
        dir.path().join("failed"),
        dir.path().join("spool"),
    );
    let ingestor = ReportIngestor::new(
        Arc::new(ScriptedForwarder(Script::Assign("42"))),
        storage,
    );

    let outcome = ingestor.ingest(sample_report()).await.unwrap();

    match outcome {
        IngestOutcome::StoredFailed { report_id, .. } => assert_eq!(report_id, "42"),
        other => panic!("expected StoredFailed, got {:?}", other),
    }

    let failed = archives_under(&dir.path().join("failed"));
    assert_eq!(failed.len(), 1);
    assert!(failed[0].to_string_lossy().contains("/client.example.com/42/"));
    assert!(archives_under(&dir.path().join("spool")).is_empty());
}

#[tokio::test]
async fn test_transient_forward_failure_spools_by_policy() {
    let dir = tempdir().unwrap();
    let storage = StorageFS::new(
        dir.path().join("reports"),
        dir.path().join("failed"),
        dir.path().join("spool"),
    );
    let ingestor = ReportIngestor::new(Arc::new(ScriptedForwarder(Script::Transient)), storage);

    let outcome = ingestor.ingest(sample_report()).await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Spooled { .. }));

    let spooled = archives_under(&dir.path().join("spool"));
    assert_eq!(spooled.len(), 1);
    // Keyed by policy id: no report id exists.
    assert!(spooled[0].to_string_lossy().contains("/client.example.com/7/"));
    assert!(archives_under(&dir.path().join("reports")).is_empty());
    assert!(archives_under(&dir.path().join("failed")).is_empty());
}

#[tokio::test]
async fn test_double_failure_is_fatal_and_leaves_nothing() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("spool"), b"not a directory").unwrap();

    let storage = StorageFS::new(
        dir.path().join("reports"),
        dir.path().join("failed"),
        dir.path().join("spool"),
    );
    let ingestor = ReportIngestor::new(Arc::new(ScriptedForwarder(Script::Transient)), storage);

    let result = ingestor.ingest(sample_report()).await;
    assert!(matches!(result, Err(IngestError::SpoolFailed(_))));

    assert!(archives_under(&dir.path().join("reports")).is_empty());
    assert!(archives_under(&dir.path().join("failed")).is_empty());
}

#[tokio::test]
async fn test_unclassified_forward_failure_skips_spool() {
    let dir = tempdir().unwrap();
    let storage = StorageFS::new(
        dir.path().join("reports"),
        dir.path().join("failed"),
        dir.path().join("spool"),
    );
    let ingestor = ReportIngestor::new(Arc::new(ScriptedForwarder(Script::Reject)), storage);

    let result = ingestor.ingest(sample_report()).await;
    assert!(matches!(
        result,
        Err(IngestError::ForwardFailed(ForwardError::Rejected { status: 422 }))
    ));

    assert!(archives_under(&dir.path().join("spool")).is_empty());
    assert!(archives_under(&dir.path().join("reports")).is_empty());
}

#[tokio::test]
async fn test_spool_drain_promotes_to_primary() {
    let dir = tempdir().unwrap();
    let storage = StorageFS::new(
        dir.path().join("reports"),
        dir.path().join("failed"),
        dir.path().join("spool"),
    );

    // First pass: upstream down, report lands in the spool.
    let ingestor = ReportIngestor::new(
        Arc::new(ScriptedForwarder(Script::Transient)),
        storage.clone(),
    );
    ingestor.ingest(sample_report()).await.unwrap();
    assert_eq!(storage.list_spooled().await.unwrap().len(), 1);

    // Second pass: upstream is back.
    let drain = SpoolDrain::new(
        Arc::new(ScriptedForwarder(Script::Assign("99"))),
        storage.clone(),
    );
    let summary = drain.drain().await.unwrap();

    assert_eq!(
        summary,
        DrainSummary {
            delivered: 1,
            remaining: 0,
            failed: 0
        }
    );
    assert!(storage.list_spooled().await.unwrap().is_empty());

    let stored = archives_under(&dir.path().join("reports"));
    assert_eq!(stored.len(), 1);
    assert!(stored[0].to_string_lossy().contains("/client.example.com/99/"));
}

#[tokio::test]
async fn test_spool_drain_leaves_entries_when_still_unreachable() {
    let dir = tempdir().unwrap();
    let storage = StorageFS::new(
        dir.path().join("reports"),
        dir.path().join("failed"),
        dir.path().join("spool"),
    );

    let ingestor = ReportIngestor::new(
        Arc::new(ScriptedForwarder(Script::Transient)),
        storage.clone(),
    );
    ingestor.ingest(sample_report()).await.unwrap();

    let drain = SpoolDrain::new(Arc::new(ScriptedForwarder(Script::Transient)), storage.clone());
    let summary = drain.drain().await.unwrap();

    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.remaining, 1);
    assert_eq!(storage.list_spooled().await.unwrap().len(), 1);
}
