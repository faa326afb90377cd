use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::json;

pub fn router() -> Router {
    Router::new().route("/health", get(get_health_check))
}

/// Liveness probe for deployments
async fn get_health_check() -> impl IntoResponse {
    (StatusCode::OK, json!({ "status": "ok" }).to_string())
}
