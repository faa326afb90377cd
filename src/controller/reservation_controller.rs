use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::controller::{AppState, SharedPlaceCatalog};
use crate::controller::restaurant_controller::PLACE_NOT_FOUND;
use crate::engines::booking_engine::BookingDecisionEngine;
use crate::models::reservation::{AvailabilityVerdict, ReservationRequest};

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/check_availability", post(check_availability))
        .route("/make_reservation", post(make_reservation))
        .route_layer(Extension(app_state.place_catalog))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    pub place_id: String,
    pub date_time: String,
    pub party_size: i64,
    pub locale: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRef {
    pub name: String,
    pub place_id: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityResponse {
    pub restaurant: RestaurantRef,
    pub requested_date_time: String,
    pub party_size: i64,
    pub availability: AvailabilityVerdict,
}

pub async fn check_availability(
    Extension(place_catalog): Extension<SharedPlaceCatalog>,
    Json(body): Json<CheckAvailabilityRequest>,
) -> impl IntoResponse {
    let locale = body.locale.as_deref().unwrap_or("en");
    let details_res = place_catalog.get_details(&body.place_id, locale).await;

    return match details_res {
        Ok(Some(restaurant)) => {
            let availability = BookingDecisionEngine.check_availability(
                &restaurant,
                &body.date_time,
                body.party_size,
            );
            let response = CheckAvailabilityResponse {
                restaurant: RestaurantRef {
                    name: restaurant.name,
                    place_id: restaurant.place_id,
                },
                requested_date_time: body.date_time,
                party_size: body.party_size,
                availability,
            };
            (StatusCode::OK, json!(response).to_string()).into_response()
        }
        Ok(None) => (StatusCode::OK, PLACE_NOT_FOUND).into_response(),
        Err(e) => {
            warn!("Something went wrong checking availability due to: {}", e);
            (
                StatusCode::BAD_REQUEST,
                "Failed to check availability, please try again.",
            )
                .into_response()
        }
    };
}

pub async fn make_reservation(
    Extension(place_catalog): Extension<SharedPlaceCatalog>,
    Json(request): Json<ReservationRequest>,
) -> impl IntoResponse {
    let details_res = place_catalog.get_details(&request.place_id, "en").await;

    return match details_res {
        Ok(Some(restaurant)) => {
            let outcome = BookingDecisionEngine.make_reservation(&restaurant, &request);
            (StatusCode::OK, json!(outcome).to_string()).into_response()
        }
        Ok(None) => (StatusCode::OK, PLACE_NOT_FOUND).into_response(),
        Err(e) => {
            warn!("Something went wrong making the reservation due to: {}", e);
            (
                StatusCode::BAD_REQUEST,
                "Failed to make the reservation, please try again.",
            )
                .into_response()
        }
    };
}
