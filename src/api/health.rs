use axum::Json;
use chrono::Utc;

/// Liveness probe; never touches the database.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
