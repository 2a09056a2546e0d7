use axum::Json;
use bytes::Bytes;
use scap_relay_core::models::ParsedReport;
use scap_relay_core::AppError;

use crate::error::HttpAppError;

/// `POST /arf/parse` — decode an in-flight archive body into the
/// structured summary without persisting anything.
pub async fn parse_report(body: Bytes) -> Result<Json<ParsedReport>, HttpAppError> {
    if body.is_empty() {
        return Err(AppError::InvalidInput("report body is empty".to_string()).into());
    }

    let report = scap_relay_arf::decode(&body)?;

    Ok(Json(report))
}
