use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;

use crate::config::Config;
use crate::controller::AppState;
use crate::repositories::place_catalog_repo::GooglePlacesCatalog;

pub mod config;
pub mod controller;
pub mod engines;
pub mod helpers;
pub mod models;
pub mod repositories;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let app_state = AppState {
        place_catalog: Arc::new(GooglePlacesCatalog::new(
            config.google_maps_api_key.clone(),
        )),
    };

    controller::serve(app_state, &config).await
}
