use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version plus the taxonomy/scorer versions scores are keyed on.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "matcher",
        "taxonomy_version": state.pipeline.taxonomy_version(),
        "scorer_version": state.pipeline.scorer_version(),
        "cache": state.pipeline.cache_stats(),
    }))
}
