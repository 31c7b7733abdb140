pub mod health;
pub mod items;
pub mod log;
pub mod metrics;

use crate::config::Config;
use crate::db::SchemaInit;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub schema: Arc<SchemaInit>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            schema: Arc::new(SchemaInit::new()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Only the API routes are counted; /health and /metrics stay out of
    // request_count.
    let api = Router::new()
        .route("/items", get(items::get_items).post(items::create_item))
        .route("/log", post(log::log_message))
        .layer(middleware::from_fn(track_requests));

    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::metrics))
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}

/// Increment `request_count{method,endpoint,status}` exactly once per
/// completed request, after the final status is known.
async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    crate::metrics::record_request(&method, &endpoint, response.status().as_str());
    response
}
