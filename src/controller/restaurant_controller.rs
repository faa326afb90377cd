use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::controller::{AppState, SharedPlaceCatalog};
use crate::engines::recommendation_engine::RecommendationEngine;
use crate::models::recommendation::Recommendation;
use crate::models::restaurant::{RestaurantRecord, SearchCriteria};

pub const DETAILS_NOT_FOUND: &str = "Restaurant not found or unable to retrieve details.";
pub const PLACE_NOT_FOUND: &str = "Restaurant not found";

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/search_restaurants", post(search_restaurants))
        .route("/restaurant_details", get(restaurant_details))
        .route("/booking_instructions", get(booking_instructions))
        .route_layer(Extension(app_state.place_catalog))
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchRestaurantsResponse {
    pub search_criteria: SearchCriteria,
    pub total_found: usize,
    pub recommendations: Vec<Recommendation>,
}

pub async fn search_restaurants(
    Extension(place_catalog): Extension<SharedPlaceCatalog>,
    Json(criteria): Json<SearchCriteria>,
) -> impl IntoResponse {
    if let Err(reason) = criteria.validate() {
        return (StatusCode::BAD_REQUEST, reason).into_response();
    }

    let search_res = place_catalog.search(&criteria).await;

    return match search_res {
        Ok(restaurants) => {
            let recommendations = RecommendationEngine::new().rank(&restaurants, &criteria);
            let response = SearchRestaurantsResponse {
                search_criteria: criteria,
                total_found: recommendations.len(),
                recommendations,
            };
            (StatusCode::OK, json!(response).to_string()).into_response()
        }
        Err(e) => {
            warn!("Something went wrong searching for restaurants due to: {}", e);
            (
                StatusCode::BAD_REQUEST,
                "Failed to search for restaurants, please try again.",
            )
                .into_response()
        }
    };
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetailsParams {
    pub place_id: String,
    pub locale: Option<String>,
}

pub async fn restaurant_details(
    Extension(place_catalog): Extension<SharedPlaceCatalog>,
    Query(params): Query<RestaurantDetailsParams>,
) -> impl IntoResponse {
    let locale = params.locale.as_deref().unwrap_or("en");
    let details_res = place_catalog.get_details(&params.place_id, locale).await;

    return match details_res {
        Ok(Some(restaurant)) => (StatusCode::OK, json!(restaurant).to_string()).into_response(),
        Ok(None) => (StatusCode::OK, DETAILS_NOT_FOUND).into_response(),
        Err(e) => {
            warn!("Something went wrong retrieving restaurant details due to: {}", e);
            (StatusCode::BAD_REQUEST, DETAILS_NOT_FOUND).into_response()
        }
    };
}

pub async fn booking_instructions(
    Extension(place_catalog): Extension<SharedPlaceCatalog>,
    Query(params): Query<RestaurantDetailsParams>,
) -> impl IntoResponse {
    let locale = params.locale.as_deref().unwrap_or("en");
    let details_res = place_catalog.get_details(&params.place_id, locale).await;

    return match details_res {
        Ok(Some(restaurant)) => {
            (StatusCode::OK, build_booking_instructions(&restaurant)).into_response()
        }
        Ok(None) => (StatusCode::OK, PLACE_NOT_FOUND).into_response(),
        Err(e) => {
            warn!("Something went wrong retrieving booking instructions due to: {}", e);
            (
                StatusCode::BAD_REQUEST,
                "Failed to retrieve booking instructions, please try again.",
            )
                .into_response()
        }
    };
}

fn build_booking_instructions(restaurant: &RestaurantRecord) -> String {
    let mut instructions = Vec::new();

    match restaurant.reservable {
        Some(true) => instructions.push(format!("{} accepts reservations.", restaurant.name)),
        Some(false) => instructions.push(format!(
            "{} does not take reservations, walk-ins only.",
            restaurant.name
        )),
        None => instructions.push(format!(
            "{} has not published whether it takes reservations, contact them directly.",
            restaurant.name
        )),
    }

    if let Some(phone) = &restaurant.phone_number {
        instructions.push(format!("Call {} to confirm or book a table.", phone));
    }
    if let Some(website) = &restaurant.website {
        instructions.push(format!("More information at {}.", website));
    }
    if !restaurant.opening_hours.is_empty() {
        instructions.push(format!(
            "Opening hours: {}.",
            restaurant.opening_hours.join("; ")
        ));
    }

    instructions.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_cover_phone_and_website() {
        let restaurant = RestaurantRecord {
            place_id: "r1".to_string(),
            name: "Banyan".to_string(),
            reservable: Some(true),
            phone_number: Some("+65 6222 0000".to_string()),
            website: Some("https://banyan.example".to_string()),
            ..RestaurantRecord::default()
        };
        let text = build_booking_instructions(&restaurant);
        assert!(text.contains("Banyan accepts reservations."));
        assert!(text.contains("+65 6222 0000"));
        assert!(text.contains("https://banyan.example"));
    }

    #[test]
    fn instructions_handle_unknown_reservation_policy() {
        let restaurant = RestaurantRecord {
            place_id: "r2".to_string(),
            name: "Warung Adi".to_string(),
            ..RestaurantRecord::default()
        };
        let text = build_booking_instructions(&restaurant);
        assert!(text.contains("contact them directly"));
    }
}
