use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness only; does not touch the database.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
