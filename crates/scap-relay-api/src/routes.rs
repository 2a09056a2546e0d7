use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    arf_delete::delete_report, arf_download::download_xml, arf_html::download_html,
    arf_parsed::download_parsed, health::health, parse_report::parse_report,
    submit_report::submit_report,
};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/arf/parse", post(parse_report))
        .route("/arf/{policy}", post(submit_report))
        .route("/arf/{id}/{cname}/{date}/{digest}/xml", get(download_xml))
        .route("/arf/{id}/{cname}/{date}/{digest}/html", get(download_html))
        .route(
            "/arf/{id}/{cname}/{date}/{digest}/parsed",
            get(download_parsed),
        )
        .route("/arf/{id}/{cname}/{date}/{digest}", delete(delete_report))
        .route("/health", get(health))
        // Report bodies regularly exceed axum's built-in body cap; the
        // configured limit is the only one that applies.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
