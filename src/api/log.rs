use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use sqlx::Connection;
use tracing::{error, info};

use crate::api::AppState;
use crate::db::{self, repo};
use crate::error::AppError;
use crate::metrics::{self, op, outcome};

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub id: i32,
    pub message: String,
}

/// POST /api/log — persist one log entry.
pub async fn log_message(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<LogResponse>), AppError> {
    let message = body
        .as_ref()
        .and_then(|Json(data)| data.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

    state.schema.ensure(&state.config.database).await;

    let mut conn = db::connect(&state.config.database).await?;
    let result = repo::insert_log(&mut conn, &message).await;
    let _ = conn.close().await;

    match result {
        Ok(id) => {
            info!("Logged message with ID {}", id);
            metrics::record_db(op::INSERT, outcome::SUCCESS);
            Ok((StatusCode::CREATED, Json(LogResponse { id, message })))
        }
        Err(e) => {
            error!("Error logging message: {}", e);
            metrics::record_db(op::INSERT, outcome::ERROR);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::collections::HashMap;

    fn test_state() -> AppState {
        AppState::new(Config::from_env_map(HashMap::new()).unwrap())
    }

    #[tokio::test]
    async fn test_missing_message_is_rejected() {
        let result = log_message(State(test_state()), Some(Json(json!({})))).await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Message is required"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_absent_body_is_rejected() {
        let result = log_message(State(test_state()), None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
