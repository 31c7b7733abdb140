//! Idempotent schema initialization.

use sqlx::{Connection, PgConnection};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::config::DatabaseConfig;
use crate::db::conn;
use crate::error::AppError;
use crate::metrics::{self, op, outcome};

const MAX_ATTEMPTS: u32 = 5;
const RETRY_INTERVAL: Duration = Duration::from_secs(5);

const CREATE_ITEMS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS items (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

const CREATE_LOGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS logs (
        id SERIAL PRIMARY KEY,
        message TEXT NOT NULL,
        timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
";

/// Create the items and logs tables if they don't exist.
///
/// Safe to call repeatedly, including concurrently. Opens its own
/// connection and closes it before returning, success or failure. The
/// `initialize` counter is only recorded once a connection exists; a
/// failed connect is already counted by the provider.
pub async fn ensure_schema(config: &DatabaseConfig) -> Result<(), AppError> {
    let mut conn = conn::connect(config).await?;
    let result = create_tables(&mut conn).await;
    let _ = conn.close().await;

    match result {
        Ok(()) => {
            info!("Database initialized successfully");
            metrics::record_db(op::INITIALIZE, outcome::SUCCESS);
            Ok(())
        }
        Err(e) => {
            error!("Database initialization error: {}", e);
            metrics::record_db(op::INITIALIZE, outcome::ERROR);
            Err(e.into())
        }
    }
}

async fn create_tables(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_ITEMS_TABLE).execute(&mut *conn).await?;
    sqlx::query(CREATE_LOGS_TABLE).execute(&mut *conn).await?;
    Ok(())
}

/// Tracks whether schema initialization has run for this process.
///
/// Startup uses the bounded retry path; the first request that reaches the
/// database runs one more defensive attempt if startup was skipped or
/// failed. After that single attempt the guard is latched either way and
/// later requests surface errors individually.
#[derive(Default)]
pub struct SchemaInit {
    cell: OnceCell<()>,
}

impl SchemaInit {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Startup initialization: up to 5 attempts, 5 seconds apart. The
    /// database container may still be starting; after the budget is
    /// exhausted the process continues in degraded mode.
    pub async fn init_with_retry(&self, config: &DatabaseConfig) {
        for attempt in 1..=MAX_ATTEMPTS {
            match ensure_schema(config).await {
                Ok(()) => {
                    let _ = self.cell.set(());
                    return;
                }
                Err(e) => {
                    if attempt < MAX_ATTEMPTS {
                        warn!(
                            "Database initialization attempt {} failed ({}), retrying in {} seconds...",
                            attempt,
                            e,
                            RETRY_INTERVAL.as_secs()
                        );
                        tokio::time::sleep(RETRY_INTERVAL).await;
                    } else {
                        error!(
                            "Failed to initialize database after {} attempts",
                            MAX_ATTEMPTS
                        );
                    }
                }
            }
        }
    }

    /// Run initialization at most once per process, for the first request
    /// that needs the database.
    pub async fn ensure(&self, config: &DatabaseConfig) {
        self.cell
            .get_or_init(|| async {
                if let Err(e) = ensure_schema(config).await {
                    warn!("Deferred database initialization failed: {}", e);
                }
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DB_REQUEST_COUNT;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            name: "app_database".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            host: "127.0.0.1".to_string(),
            // nothing listens on port 1, so connects fail immediately
            port: 1,
        }
    }

    // Single test body: the counters are process-global, so the guard and
    // retry assertions must not run on parallel test threads.
    #[tokio::test(start_paused = true)]
    async fn test_guard_latches_and_retry_is_bounded() {
        let connect_errors = DB_REQUEST_COUNT.with_label_values(&[op::CONNECT, outcome::ERROR]);
        let init_errors = DB_REQUEST_COUNT.with_label_values(&[op::INITIALIZE, outcome::ERROR]);
        let config = unreachable_config();

        let guard = SchemaInit::new();
        let before = connect_errors.get();
        guard.ensure(&config).await;
        guard.ensure(&config).await;
        // second call must not re-attempt
        assert_eq!(connect_errors.get(), before + 1);

        let before = connect_errors.get();
        let init_before = init_errors.get();
        guard.init_with_retry(&config).await;
        assert_eq!(connect_errors.get(), before + MAX_ATTEMPTS as u64);
        // connect never succeeded, so the initialize counter stays put
        assert_eq!(init_errors.get(), init_before);
    }
}
