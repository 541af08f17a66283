//! Liveness and configuration diagnostics.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::instrument;

use crate::AppState;

/// Liveness probe. Deliberately checks nothing beyond the process
/// being able to answer.
pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Reports presence of the five required configuration values as
/// `"OK"`/`"MISSING"`, never their contents.
#[instrument(name = "debug_env", skip_all)]
pub async fn debug_env(State(state): State<AppState>) -> Json<Value> {
    let mut status = serde_json::Map::new();
    for (name, present) in state.config.required_values() {
        let value = if present { "OK" } else { "MISSING" };
        status.insert(name.to_string(), Value::String(value.to_string()));
    }

    Json(Value::Object(status))
}
