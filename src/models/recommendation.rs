use serde::{Deserialize, Serialize};
use crate::models::restaurant::RestaurantRecord;

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub restaurant: RestaurantRecord,
    pub score: f64,
    pub reasoning: Vec<String>,
    pub suitability_for_event: f64,
    pub mood_match: f64,
}
