use sha2::{Digest, Sha256};
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::models::reservation::{AvailabilityVerdict, ReservationOutcome, ReservationRequest};
use crate::models::restaurant::RestaurantRecord;

pub const MIN_PARTY_SIZE: i64 = 1;
pub const MAX_PARTY_SIZE: i64 = 20;

/// Baseline odds that a valid slot is free. Lowered for oversized parties and
/// off-peak hours, where a real restaurant would be less likely to take the
/// booking.
const BASE_AVAILABILITY_THRESHOLD: f64 = 0.75;
const LARGE_PARTY_PENALTY: f64 = 0.30;
const OFF_PEAK_PENALTY: f64 = 0.30;
const MIN_AVAILABILITY_THRESHOLD: f64 = 0.10;

const LARGE_PARTY_CUTOFF: i64 = 8;
const FIRST_USUAL_HOUR: u8 = 11;
const LAST_USUAL_HOUR: u8 = 22;

const SLOT_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

const NAIVE_FORMATS: &[&[FormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
];

/// Decides reservations without a restaurant-side integration: validation is
/// real, availability is a reproducible function of the reservation triple.
pub struct BookingDecisionEngine;

impl BookingDecisionEngine {
    pub fn check_availability(
        &self,
        restaurant: &RestaurantRecord,
        date_time: &str,
        party_size: i64,
    ) -> AvailabilityVerdict {
        let when = match parse_date_time(date_time) {
            Some(when) => when,
            None => {
                return declined(format!(
                    "Could not understand the requested date/time \"{}\". Use the format YYYY-MM-DD HH:MM.",
                    date_time.trim()
                ));
            }
        };

        if when <= OffsetDateTime::now_utc() {
            return declined(
                "Reservations cannot be made for past dates. Please pick a future date and time."
                    .to_string(),
            );
        }

        if !(MIN_PARTY_SIZE..=MAX_PARTY_SIZE).contains(&party_size) {
            return declined(format!(
                "Party size must be between {} and {} people.",
                MIN_PARTY_SIZE, MAX_PARTY_SIZE
            ));
        }

        if restaurant.reservable == Some(false) {
            return declined(format!("{} does not accept reservations.", restaurant.name));
        }

        let slot = format_slot(when, date_time);
        let fraction = slot_fraction(&restaurant.place_id, when, party_size);
        let threshold = availability_threshold(party_size, when.hour());

        if fraction < threshold {
            AvailabilityVerdict {
                available: true,
                message: format!(
                    "{} can seat {} people at {}.",
                    restaurant.name, party_size, slot
                ),
                suggested_slots: Some(vec![slot]),
            }
        } else {
            declined(format!(
                "{} has no table for {} people at {}. Try a different time or party size.",
                restaurant.name, party_size, slot
            ))
        }
    }

    pub fn make_reservation(
        &self,
        restaurant: &RestaurantRecord,
        request: &ReservationRequest,
    ) -> ReservationOutcome {
        // Contact details are checked before any availability derivation, a
        // request that cannot be booked should fail without one.
        let contact_name = request.contact_name.as_deref().map(str::trim).unwrap_or("");
        let contact_phone = request.contact_phone.as_deref().map(str::trim).unwrap_or("");
        if contact_name.is_empty() || contact_phone.is_empty() {
            return ReservationOutcome {
                success: false,
                message: "A contact name and phone number are required to book a table."
                    .to_string(),
                confirmation_code: None,
            };
        }

        let verdict =
            self.check_availability(restaurant, &request.date_time, request.party_size);
        if !verdict.available {
            return ReservationOutcome {
                success: false,
                message: verdict.message,
                confirmation_code: None,
            };
        }

        let slot = verdict
            .suggested_slots
            .as_ref()
            .and_then(|slots| slots.first())
            .cloned()
            .unwrap_or_else(|| request.date_time.trim().to_string());
        let code = confirmation_code(
            &request.place_id,
            &slot,
            request.party_size,
            contact_phone,
        );

        ReservationOutcome {
            success: true,
            message: format!(
                "Reserved a table for {} at {} on {}, booked under {}.",
                request.party_size, restaurant.name, slot, contact_name
            ),
            confirmation_code: Some(code),
        }
    }
}

fn declined(message: String) -> AvailabilityVerdict {
    AvailabilityVerdict {
        available: false,
        message,
        suggested_slots: None,
    }
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD HH:MM[:SS]` stamp, the latter read
/// in the venue's own clock and pinned to UTC.
fn parse_date_time(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(when) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(when);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(raw, *format).ok())
        .map(PrimitiveDateTime::assume_utc)
}

fn format_slot(when: OffsetDateTime, raw: &str) -> String {
    when.format(&SLOT_FORMAT)
        .unwrap_or_else(|_| raw.trim().to_string())
}

/// Maps the reservation triple onto [0, 1). Stable across calls and process
/// restarts, which keeps verdicts reproducible without stored state.
fn slot_fraction(place_id: &str, when: OffsetDateTime, party_size: i64) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(place_id.as_bytes());
    hasher.update(b"|");
    hasher.update(when.unix_timestamp().to_be_bytes());
    hasher.update(b"|");
    hasher.update(party_size.to_be_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) as f64 / u64::MAX as f64
}

fn availability_threshold(party_size: i64, hour: u8) -> f64 {
    let mut threshold = BASE_AVAILABILITY_THRESHOLD;
    if party_size > LARGE_PARTY_CUTOFF {
        threshold -= LARGE_PARTY_PENALTY;
    }
    if hour < FIRST_USUAL_HOUR || hour >= LAST_USUAL_HOUR {
        threshold -= OFF_PEAK_PENALTY;
    }
    threshold.max(MIN_AVAILABILITY_THRESHOLD)
}

fn confirmation_code(place_id: &str, slot: &str, party_size: i64, contact_phone: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(place_id.as_bytes());
    hasher.update(b"|");
    hasher.update(slot.as_bytes());
    hasher.update(b"|");
    hasher.update(party_size.to_be_bytes());
    hasher.update(b"|");
    hasher.update(contact_phone.as_bytes());
    let digest = hasher.finalize();
    format!("RSV-{}", &format!("{:x}", digest)[..10].to_uppercase())
}
