//! Inbound HTTP surface.

pub mod analysis;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::service::Auditor;

pub struct AppState {
    pub auditor: Arc<dyn Auditor>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/analyze",
            post(analysis::analyze).get(analysis::get_not_supported),
        )
        .route(
            "/api/analyze/batch",
            post(analysis::analyze_batch).get(analysis::get_not_supported),
        )
        .route(
            "/analyze",
            post(analysis::analyze).get(analysis::get_not_supported),
        )
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
