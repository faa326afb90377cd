use anyhow::{anyhow, Context};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tracing::warn;

use crate::models::restaurant::{Location, RestaurantRecord, SearchCriteria};

/// Upper bound on per-search detail lookups against the places API.
pub const MAX_DETAIL_LOOKUPS: usize = 10;

const SEARCH_STATUS_OK: &str = "OK";
const SEARCH_STATUS_EMPTY: &str = "ZERO_RESULTS";
const DETAILS_STATUS_MISSING: &str = "NOT_FOUND";

const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

const DETAIL_FIELDS: &str = "place_id,name,formatted_address,vicinity,geometry/location,rating,\
user_ratings_total,price_level,types,opening_hours/weekday_text,formatted_phone_number,website,\
url,reservable,delivery,dine_in,takeout,serves_breakfast,serves_lunch,serves_dinner,\
serves_brunch,serves_beer,serves_wine,serves_vegetarian_food";

/// Place types that say nothing about cuisine.
const GENERIC_PLACE_TYPES: &[&str] = &[
    "restaurant",
    "food",
    "point_of_interest",
    "establishment",
    "meal_takeaway",
    "meal_delivery",
];

/// Contract for the mapping provider the engines are fed from. Absent records
/// come back as `Ok(None)`, upstream failures as `Err`.
#[async_trait]
pub trait PlaceCatalog: Send + Sync {
    async fn search(&self, criteria: &SearchCriteria) -> anyhow::Result<Vec<RestaurantRecord>>;

    async fn get_details(
        &self,
        place_id: &str,
        locale: &str,
    ) -> anyhow::Result<Option<RestaurantRecord>>;
}

pub struct GooglePlacesCatalog {
    http_client: reqwest::Client,
    api_key: String,
}

impl GooglePlacesCatalog {
    pub fn new(api_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn nearby_search(
        &self,
        latitude: f64,
        longitude: f64,
        criteria: &SearchCriteria,
    ) -> anyhow::Result<Vec<PlaceSummary>> {
        let mut params = vec![
            ("location".to_string(), format!("{},{}", latitude, longitude)),
            ("radius".to_string(), format!("{:.0}", criteria.radius)),
            ("type".to_string(), "restaurant".to_string()),
            ("language".to_string(), criteria.locale.clone()),
            ("key".to_string(), self.api_key.clone()),
        ];
        if let Some(keyword) = search_keyword(criteria) {
            params.push(("keyword".to_string(), keyword));
        }

        self.fetch_summaries(NEARBY_SEARCH_URL, &params).await
    }

    async fn text_search(
        &self,
        place_name: &str,
        criteria: &SearchCriteria,
    ) -> anyhow::Result<Vec<PlaceSummary>> {
        let mut query = format!("restaurants near {}", place_name);
        if let Some(keyword) = search_keyword(criteria) {
            query = format!("{} {}", keyword, query);
        }
        let params = vec![
            ("query".to_string(), query),
            ("type".to_string(), "restaurant".to_string()),
            ("language".to_string(), criteria.locale.clone()),
            ("key".to_string(), self.api_key.clone()),
        ];

        self.fetch_summaries(TEXT_SEARCH_URL, &params).await
    }

    async fn fetch_summaries(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> anyhow::Result<Vec<PlaceSummary>> {
        let response: PlacesSearchResponse = self
            .http_client
            .get(url)
            .query(params)
            .send()
            .await
            .context("Error reaching the places API")?
            .json()
            .await
            .context("Error decoding the places API search response")?;

        match response.status.as_str() {
            SEARCH_STATUS_OK => Ok(response.results),
            SEARCH_STATUS_EMPTY => Ok(Vec::new()),
            status => Err(anyhow!(
                "Places search failed with status {}: {}",
                status,
                response.error_message.unwrap_or_default()
            )),
        }
    }

    async fn fetch_details(
        &self,
        place_id: &str,
        locale: &str,
    ) -> anyhow::Result<Option<RestaurantRecord>> {
        let params = [
            ("place_id".to_string(), place_id.to_string()),
            ("fields".to_string(), DETAIL_FIELDS.to_string()),
            ("language".to_string(), locale.to_string()),
            ("key".to_string(), self.api_key.clone()),
        ];

        let response: PlaceDetailsResponse = self
            .http_client
            .get(DETAILS_URL)
            .query(&params)
            .send()
            .await
            .context("Error reaching the places API")?
            .json()
            .await
            .context("Error decoding the places API details response")?;

        match response.status.as_str() {
            SEARCH_STATUS_OK => Ok(response.result.map(PlaceDetails::into_record)),
            DETAILS_STATUS_MISSING | SEARCH_STATUS_EMPTY | "INVALID_REQUEST" => Ok(None),
            status => Err(anyhow!(
                "Places details failed with status {}: {}",
                status,
                response.error_message.unwrap_or_default()
            )),
        }
    }
}

#[async_trait]
impl PlaceCatalog for GooglePlacesCatalog {
    async fn search(&self, criteria: &SearchCriteria) -> anyhow::Result<Vec<RestaurantRecord>> {
        let summaries = match (criteria.latitude, criteria.longitude, &criteria.place_name) {
            (Some(latitude), Some(longitude), _) => {
                self.nearby_search(latitude, longitude, criteria).await?
            }
            (_, _, Some(place_name)) => self.text_search(place_name, criteria).await?,
            _ => return Ok(Vec::new()),
        };

        let origin = match (criteria.latitude, criteria.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location {
                latitude,
                longitude,
            }),
            _ => None,
        };

        let detail_lookups = summaries
            .iter()
            .take(MAX_DETAIL_LOOKUPS)
            .map(|summary| self.fetch_details(&summary.place_id, &criteria.locale));

        let mut records = Vec::new();
        for details_res in join_all(detail_lookups).await {
            match details_res {
                Ok(Some(mut record)) => {
                    if let Some(origin) = &origin {
                        record.distance =
                            Some(haversine_distance(origin, &record.location));
                    }
                    records.push(record);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Something went wrong fetching place details due to: {}", e);
                }
            }
        }
        Ok(records)
    }

    async fn get_details(
        &self,
        place_id: &str,
        locale: &str,
    ) -> anyhow::Result<Option<RestaurantRecord>> {
        self.fetch_details(place_id, locale).await
    }
}

fn search_keyword(criteria: &SearchCriteria) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(keyword) = &criteria.keyword {
        if !keyword.trim().is_empty() {
            parts.push(keyword.trim().to_string());
        }
    }
    for cuisine in &criteria.cuisine_types {
        if !cuisine.trim().is_empty() {
            parts.push(cuisine.trim().to_string());
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates.
pub fn haversine_distance(from: &Location, to: &Location) -> f64 {
    let from_lat = from.latitude.to_radians();
    let to_lat = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[derive(Deserialize, Debug)]
struct PlacesSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceSummary>,
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PlaceSummary {
    place_id: String,
}

#[derive(Deserialize, Debug)]
struct PlaceDetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PlaceDetails {
    place_id: String,
    name: String,
    formatted_address: Option<String>,
    vicinity: Option<String>,
    geometry: Geometry,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
    price_level: Option<u8>,
    #[serde(default)]
    types: Vec<String>,
    opening_hours: Option<OpeningHours>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
    url: Option<String>,
    reservable: Option<bool>,
    delivery: Option<bool>,
    dine_in: Option<bool>,
    takeout: Option<bool>,
    serves_breakfast: Option<bool>,
    serves_lunch: Option<bool>,
    serves_dinner: Option<bool>,
    serves_brunch: Option<bool>,
    serves_beer: Option<bool>,
    serves_wine: Option<bool>,
    serves_vegetarian_food: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize, Debug)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize, Debug)]
struct OpeningHours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

impl PlaceDetails {
    fn into_record(self) -> RestaurantRecord {
        let cuisine_types = self
            .types
            .iter()
            .filter(|place_type| !GENERIC_PLACE_TYPES.contains(&place_type.as_str()))
            .cloned()
            .collect();

        RestaurantRecord {
            place_id: self.place_id,
            name: self.name,
            address: self
                .formatted_address
                .or(self.vicinity)
                .unwrap_or_default(),
            location: Location {
                latitude: self.geometry.location.lat,
                longitude: self.geometry.location.lng,
            },
            rating: self.rating,
            user_ratings_total: self.user_ratings_total.unwrap_or(0),
            // The provider's scale starts at 0 for free venues, the record
            // keeps the 1 to 4 range only.
            price_level: self.price_level.filter(|level| (1..=4).contains(level)),
            cuisine_types,
            reservable: self.reservable,
            delivery: self.delivery,
            dine_in: self.dine_in,
            takeout: self.takeout,
            serves_breakfast: self.serves_breakfast,
            serves_lunch: self.serves_lunch,
            serves_dinner: self.serves_dinner,
            serves_brunch: self.serves_brunch,
            serves_beer: self.serves_beer,
            serves_wine: self.serves_wine,
            serves_vegetarian_food: self.serves_vegetarian_food,
            opening_hours: self
                .opening_hours
                .map(|hours| hours.weekday_text)
                .unwrap_or_default(),
            phone_number: self.formatted_phone_number,
            website: self.website,
            google_maps_url: self.url,
            distance: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_matches_a_known_city_pair() {
        // Marina Bay Sands to Raffles Place, roughly 1.1 km.
        let from = Location {
            latitude: 1.2834,
            longitude: 103.8607,
        };
        let to = Location {
            latitude: 1.2839,
            longitude: 103.8514,
        };
        let distance = haversine_distance(&from, &to);
        assert!((900.0..1300.0).contains(&distance), "got {}", distance);
    }

    #[test]
    fn haversine_of_identical_points_is_zero() {
        let point = Location {
            latitude: 1.3000,
            longitude: 103.8500,
        };
        assert!(haversine_distance(&point, &point) < 1e-6);
    }

    #[test]
    fn detail_payload_maps_onto_a_record() {
        let payload = r#"{
            "place_id": "abc123",
            "name": "Nonya Kitchen",
            "formatted_address": "21 Joo Chiat Rd",
            "geometry": { "location": { "lat": 1.31, "lng": 103.9 } },
            "rating": 4.3,
            "user_ratings_total": 412,
            "price_level": 2,
            "types": ["restaurant", "peranakan_restaurant", "food"],
            "opening_hours": { "weekday_text": ["Monday: 11:00 AM - 10:00 PM"] },
            "formatted_phone_number": "+65 6334 1122",
            "website": "https://nonyakitchen.example",
            "url": "https://maps.google.com/?cid=1",
            "reservable": true,
            "dine_in": true,
            "serves_dinner": true
        }"#;
        let details: PlaceDetails = serde_json::from_str(payload).unwrap();
        let record = details.into_record();

        assert_eq!(record.place_id, "abc123");
        assert_eq!(record.cuisine_types, vec!["peranakan_restaurant"]);
        assert_eq!(record.price_level, Some(2));
        assert_eq!(record.reservable, Some(true));
        assert_eq!(record.serves_wine, None);
        assert_eq!(record.opening_hours.len(), 1);
        assert!(record.distance.is_none());
    }

    #[test]
    fn free_tier_price_levels_are_dropped() {
        let payload = r#"{
            "place_id": "soup-1",
            "name": "Soup Counter",
            "geometry": { "location": { "lat": 0.0, "lng": 0.0 } },
            "price_level": 0
        }"#;
        let details: PlaceDetails = serde_json::from_str(payload).unwrap();
        assert_eq!(details.into_record().price_level, None);
    }

    #[test]
    fn keyword_combines_free_text_and_cuisines() {
        let criteria = SearchCriteria {
            latitude: Some(1.3),
            longitude: Some(103.85),
            place_name: None,
            cuisine_types: vec!["thai".to_string(), " ".to_string()],
            keyword: Some("riverside".to_string()),
            mood: "casual".to_string(),
            event: "gathering".to_string(),
            radius: 1500.0,
            price_level: None,
            locale: "en".to_string(),
        };
        assert_eq!(search_keyword(&criteria), Some("riverside thai".to_string()));

        let bare = SearchCriteria {
            cuisine_types: vec![],
            keyword: None,
            ..criteria
        };
        assert_eq!(search_keyword(&bare), None);
    }
}
