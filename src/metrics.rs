//! Process-wide request and database counters.
//!
//! Two counter families cover the whole service: HTTP outcomes by
//! (method, endpoint, status) and database-operation outcomes by
//! (operation, status). Both live in the default prometheus registry and
//! are exported through the `/metrics` endpoint.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec, TextEncoder};

lazy_static! {
    /// HTTP request outcomes.
    /// Labels: method (GET, POST), endpoint (route template), status (HTTP code)
    pub static ref REQUEST_COUNT: IntCounterVec = register_int_counter_vec!(
        "request_count",
        "App Request Count",
        &["method", "endpoint", "status"]
    )
    .expect("Failed to register request_count");

    /// Database operation outcomes.
    /// Labels: operation (connect, initialize, select, insert), status (success, error)
    pub static ref DB_REQUEST_COUNT: IntCounterVec = register_int_counter_vec!(
        "db_request_count",
        "Database Request Count",
        &["operation", "status"]
    )
    .expect("Failed to register db_request_count");
}

pub mod op {
    pub const CONNECT: &str = "connect";
    pub const INITIALIZE: &str = "initialize";
    pub const SELECT: &str = "select";
    pub const INSERT: &str = "insert";
}

pub mod outcome {
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
}

/// Record one database operation outcome.
pub fn record_db(operation: &str, outcome: &str) {
    DB_REQUEST_COUNT
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Record one completed HTTP request.
pub fn record_request(method: &str, endpoint: &str, status: &str) {
    REQUEST_COUNT
        .with_label_values(&[method, endpoint, status])
        .inc();
}

/// Render the current snapshot of the default registry in the Prometheus
/// text exposition format. Read-only; an encoding failure yields an empty
/// body rather than an error response.
pub fn export() -> String {
    let encoder = TextEncoder::new();
    encoder
        .encode_to_string(&prometheus::gather())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_monotonic() {
        let counter = DB_REQUEST_COUNT.with_label_values(&[op::CONNECT, outcome::SUCCESS]);
        let before = counter.get();
        record_db(op::CONNECT, outcome::SUCCESS);
        record_db(op::CONNECT, outcome::SUCCESS);
        assert_eq!(counter.get(), before + 2);
    }

    #[test]
    fn test_export_contains_recorded_series() {
        record_request("GET", "/api/items", "200");
        let text = export();
        assert!(text.contains("request_count"));
        assert!(text.contains("method=\"GET\""));
        assert!(text.contains("endpoint=\"/api/items\""));
        assert!(text.contains("status=\"200\""));
    }

    #[test]
    fn test_export_declares_counter_type() {
        record_db(op::INITIALIZE, outcome::SUCCESS);
        let text = export();
        assert!(text.contains("# TYPE db_request_count counter"));
    }
}
