use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::HttpAppError;
use crate::state::AppState;

/// `DELETE /arf/{id}/{cname}/{date}/{digest}` — remove every artifact
/// under the resolved path. Deleting an already-absent report reports
/// `FileNotFound`, never silent success.
pub async fn delete_report(
    Path((id, cname, date, _digest)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HttpAppError> {
    state.storage.delete_arf_file(&cname, &id, &date).await?;

    Ok(StatusCode::OK)
}
