use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use scap_relay_core::models::ParsedReport;

use crate::error::HttpAppError;
use crate::state::AppState;

/// `GET /arf/{id}/{cname}/{date}/{digest}/parsed` — decode a stored
/// archive into the structured summary.
pub async fn download_parsed(
    Path((id, cname, date, digest)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ParsedReport>, HttpAppError> {
    let data = state.storage.get_arf_xml(&cname, &id, &date, &digest).await?;

    let report = scap_relay_arf::decode(&data)?;

    Ok(Json(report))
}
