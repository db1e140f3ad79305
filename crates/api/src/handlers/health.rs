use axum::Json;
use serde_json::{json, Value};

/// Liveness answer with enough identity to tell deployments apart.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "fathom",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
