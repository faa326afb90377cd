use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::handler::HandlerWithoutStateExt;
use axum::http::HeaderValue;
use axum::Router;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::repositories::place_catalog_repo::PlaceCatalog;

pub mod health_check;
pub mod reservation_controller;
pub mod restaurant_controller;

pub type SharedPlaceCatalog = Arc<dyn PlaceCatalog>;

#[derive(Clone)]
pub struct AppState {
    pub place_catalog: SharedPlaceCatalog,
}

pub async fn serve(app_state: AppState, config: &Config) -> anyhow::Result<()> {
    let origins: Vec<HeaderValue> = config
        .origin_urls
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let application = router_endpoints(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                        .allow_origin(origins)
                        .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
                )
                .layer(CompressionLayer::new()),
        )
        .fallback_service(page_not_found_handler.into_service());

    let address = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    info!("API server listening on port: {}", address);
    axum::Server::bind(&address)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new().merge(health_check::router()).nest(
        "/tools",
        restaurant_controller::router(app_state.clone())
            .merge(reservation_controller::router(app_state)),
    )
}
