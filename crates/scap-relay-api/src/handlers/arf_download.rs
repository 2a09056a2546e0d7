use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use scap_relay_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// `GET /arf/{id}/{cname}/{date}/{digest}/xml` — the raw stored archive.
pub async fn download_xml(
    Path((id, cname, date, digest)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let data = state.storage.get_arf_xml(&cname, &id, &date, &digest).await?;

    tracing::debug!(
        common_name = %cname,
        report_id = %id,
        digest = %digest,
        size_bytes = data.len(),
        "Serving stored archive"
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-bzip2")
        .body(Body::from(data))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
