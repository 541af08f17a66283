//! Static landing-page handler.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::AppState;

/// Serves the configured landing-page file at `/`.
pub async fn landing_page(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.config.landing_page).await {
        Ok(bytes) => {
            ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response()
        },
        Err(e) => {
            warn!(path = %state.config.landing_page, error = %e, "Landing page file unavailable");
            StatusCode::NOT_FOUND.into_response()
        },
    }
}
