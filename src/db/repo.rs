//! Queries against the items and logs tables.
//!
//! Every function executes exactly one statement on a caller-owned
//! connection; the caller decides when the connection is closed.

use chrono::NaiveDateTime;
use sqlx::PgConnection;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// All items, newest first.
pub async fn list_items(conn: &mut PgConnection) -> Result<Vec<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>("SELECT id, name, created_at FROM items ORDER BY created_at DESC")
        .fetch_all(conn)
        .await
}

/// Insert one item and return its generated id.
pub async fn insert_item(conn: &mut PgConnection, name: &str) -> Result<i32, sqlx::Error> {
    let (id,): (i32,) = sqlx::query_as("INSERT INTO items (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(id)
}

/// Insert one log entry and return its generated id.
pub async fn insert_log(conn: &mut PgConnection, message: &str) -> Result<i32, sqlx::Error> {
    let (id,): (i32,) = sqlx::query_as("INSERT INTO logs (message) VALUES ($1) RETURNING id")
        .bind(message)
        .fetch_one(conn)
        .await?;
    Ok(id)
}
