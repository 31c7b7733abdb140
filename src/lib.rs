pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;

pub use config::{Config, DatabaseConfig};
pub use error::AppError;
