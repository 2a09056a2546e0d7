use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
};

use crate::error::HttpAppError;
use crate::state::AppState;

/// `GET /arf/{id}/{cname}/{date}/{digest}/html` — HTML view of the
/// stored archive, rendered lazily at retrieval time.
pub async fn download_html(
    Path((id, cname, date, digest)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .storage
        .get_arf_html(&cname, &id, &date, &digest)
        .await?;

    Ok(Html(page))
}
