use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized place record as returned by the mapping provider. Service flags
/// are tri-state: `None` means the provider did not report the flag.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub location: Location,
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: u64,
    pub price_level: Option<u8>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    pub reservable: Option<bool>,
    pub delivery: Option<bool>,
    pub dine_in: Option<bool>,
    pub takeout: Option<bool>,
    pub serves_breakfast: Option<bool>,
    pub serves_lunch: Option<bool>,
    pub serves_dinner: Option<bool>,
    pub serves_brunch: Option<bool>,
    pub serves_beer: Option<bool>,
    pub serves_wine: Option<bool>,
    pub serves_vegetarian_food: Option<bool>,
    #[serde(default)]
    pub opening_hours: Vec<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub google_maps_url: Option<String>,
    pub distance: Option<f64>,
}

#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_name: Option<String>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    pub keyword: Option<String>,
    pub mood: String,
    pub event: String,
    pub radius: f64,
    pub price_level: Option<u8>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    "en".to_string()
}

impl SearchCriteria {
    /// Exactly one location-selection mode must be present: a coordinate pair
    /// or a place name, never both and never neither.
    pub fn validate(&self) -> Result<(), String> {
        let has_coordinates = self.latitude.is_some() && self.longitude.is_some();
        let has_partial_coordinates = self.latitude.is_some() != self.longitude.is_some();
        let has_place_name = self
            .place_name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false);

        if has_partial_coordinates {
            return Err("Both latitude and longitude are required when searching by coordinates".to_string());
        }
        if has_coordinates == has_place_name {
            return Err("Provide either latitude/longitude or a placeName, but not both".to_string());
        }
        if self.radius <= 0.0 {
            return Err("Search radius must be greater than zero".to_string());
        }
        Ok(())
    }
}
