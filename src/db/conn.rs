//! Per-call database connection provider.

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, error};

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::metrics::{self, op, outcome};

/// Open a single database connection.
///
/// Each call establishes a fresh session; the caller owns the returned
/// handle and is responsible for closing it on every exit path. Retry
/// policy belongs to the caller, not here. Every attempt records a
/// `db_request_count{connect,..}` outcome.
pub async fn connect(config: &DatabaseConfig) -> Result<PgConnection, AppError> {
    debug!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "Connecting to database"
    );

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name);

    match PgConnection::connect_with(&options).await {
        Ok(conn) => {
            metrics::record_db(op::CONNECT, outcome::SUCCESS);
            Ok(conn)
        }
        Err(e) => {
            error!("Database connection error: {}", e);
            metrics::record_db(op::CONNECT, outcome::ERROR);
            Err(AppError::Connect)
        }
    }
}
