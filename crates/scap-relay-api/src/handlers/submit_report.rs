use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use bytes::Bytes;
use scap_relay_core::models::ScanReport;
use scap_relay_core::AppError;
use scap_relay_services::IngestOutcome;

use crate::auth::ClientIdentity;
use crate::error::HttpAppError;
use crate::state::AppState;

/// `POST /arf/{policy}` — ingest one report.
///
/// Every recovered outcome answers 200 with no body; only the `Fatal`
/// terminal state (double failure or an unclassified forwarding error)
/// surfaces an error to the client.
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    ClientIdentity(common_name): ClientIdentity,
    Path(policy): Path<String>,
    body: Bytes,
) -> Result<StatusCode, HttpAppError> {
    if body.is_empty() {
        return Err(AppError::InvalidInput("report body is empty".to_string()).into());
    }

    let report = ScanReport::new(common_name.clone(), policy.clone(), body);
    let digest = report.digest().to_string();

    let outcome = state.ingestor.ingest(report).await?;

    match &outcome {
        IngestOutcome::Stored { report_id, .. } => {
            tracing::info!(
                common_name = %common_name,
                policy = %policy,
                report_id = %report_id,
                digest = %digest,
                "Report forwarded and stored"
            );
        }
        IngestOutcome::StoredFailed { report_id, .. } => {
            tracing::warn!(
                common_name = %common_name,
                policy = %policy,
                report_id = %report_id,
                digest = %digest,
                "Report forwarded; stored under the failed root pending manual remediation"
            );
        }
        IngestOutcome::Spooled { .. } => {
            tracing::warn!(
                common_name = %common_name,
                policy = %policy,
                digest = %digest,
                "Report spooled for out-of-band delivery"
            );
        }
    }

    Ok(StatusCode::OK)
}
