use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub place_id: String,
    pub date_time: String,
    pub party_size: i64,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub special_requests: Option<String>,
}

/// `suggested_slots` is carried only on a positive verdict and may be empty.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityVerdict {
    pub available: bool,
    pub message: String,
    pub suggested_slots: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReservationOutcome {
    pub success: bool,
    pub message: String,
    pub confirmation_code: Option<String>,
}
