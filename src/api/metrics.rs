use axum::http::header;
use axum::response::IntoResponse;

/// Prometheus text exposition of the current counter snapshot.
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::export(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::Response;

    async fn respond() -> Response {
        metrics().await.into_response()
    }

    #[tokio::test]
    async fn test_metrics_is_plain_text() {
        let resp = respond().await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/plain"));
    }
}
