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

// Matches datetime.isoformat(): naive, microsecond precision.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Serialize)]
pub struct ItemDto {
    pub id: i32,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<ItemDto>,
}

#[derive(Debug, Serialize)]
pub struct CreateItemResponse {
    pub id: i32,
    pub name: String,
}

/// GET /api/items — all items, newest first.
pub async fn get_items(State(state): State<AppState>) -> Result<Json<ItemsResponse>, AppError> {
    state.schema.ensure(&state.config.database).await;

    let mut conn = db::connect(&state.config.database).await?;
    let result = repo::list_items(&mut conn).await;
    let _ = conn.close().await;

    match result {
        Ok(rows) => {
            info!("Retrieved {} items from database", rows.len());
            metrics::record_db(op::SELECT, outcome::SUCCESS);
            let items = rows
                .into_iter()
                .map(|row| ItemDto {
                    id: row.id,
                    name: row.name,
                    created_at: row.created_at.format(ISO_FORMAT).to_string(),
                })
                .collect();
            Ok(Json(ItemsResponse { items }))
        }
        Err(e) => {
            error!("Error retrieving items: {}", e);
            metrics::record_db(op::SELECT, outcome::ERROR);
            Err(e.into())
        }
    }
}

/// POST /api/items — insert one item, echoing back its generated id.
pub async fn create_item(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<CreateItemResponse>), AppError> {
    let name = body
        .as_ref()
        .and_then(|Json(data)| data.get("name"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::BadRequest("Name is required".to_string()))?;

    state.schema.ensure(&state.config.database).await;

    let mut conn = db::connect(&state.config.database).await?;
    let result = repo::insert_item(&mut conn, &name).await;
    let _ = conn.close().await;

    match result {
        Ok(id) => {
            info!("Created new item with ID {}", id);
            metrics::record_db(op::INSERT, outcome::SUCCESS);
            Ok((StatusCode::CREATED, Json(CreateItemResponse { id, name })))
        }
        Err(e) => {
            error!("Error creating item: {}", e);
            metrics::record_db(op::INSERT, outcome::ERROR);
            Err(e.into())
        }
    }
}
