use crate::models::restaurant::RestaurantRecord;

/// A venue attribute implied by a mood or event token. Each variant is a
/// predicate over the provider's record; unreported flags never satisfy one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VenueAttribute {
    PriceAtLeast(u8),
    PriceAtMost(u8),
    ServesAlcohol,
    ServesDinner,
    ServesLunch,
    DineIn,
    Reservable,
    TakeoutOrDelivery,
    DeliveryOrDineIn,
}

impl VenueAttribute {
    pub fn satisfied_by(&self, restaurant: &RestaurantRecord) -> bool {
        match self {
            VenueAttribute::PriceAtLeast(level) => {
                restaurant.price_level.map(|p| p >= *level).unwrap_or(false)
            }
            VenueAttribute::PriceAtMost(level) => {
                restaurant.price_level.map(|p| p <= *level).unwrap_or(false)
            }
            VenueAttribute::ServesAlcohol => {
                flag(restaurant.serves_wine) || flag(restaurant.serves_beer)
            }
            VenueAttribute::ServesDinner => flag(restaurant.serves_dinner),
            VenueAttribute::ServesLunch => flag(restaurant.serves_lunch),
            VenueAttribute::DineIn => flag(restaurant.dine_in),
            VenueAttribute::Reservable => flag(restaurant.reservable),
            VenueAttribute::TakeoutOrDelivery => {
                flag(restaurant.takeout) || flag(restaurant.delivery)
            }
            VenueAttribute::DeliveryOrDineIn => {
                flag(restaurant.delivery) || flag(restaurant.dine_in)
            }
        }
    }
}

fn flag(value: Option<bool>) -> bool {
    value.unwrap_or(false)
}

pub struct LexiconEntry {
    pub token: &'static str,
    pub implies: &'static [VenueAttribute],
}

pub const MOOD_LEXICON: &[LexiconEntry] = &[
    LexiconEntry {
        token: "romantic",
        implies: &[
            VenueAttribute::PriceAtLeast(3),
            VenueAttribute::ServesAlcohol,
            VenueAttribute::DineIn,
        ],
    },
    LexiconEntry {
        token: "casual",
        implies: &[
            VenueAttribute::PriceAtMost(2),
            VenueAttribute::TakeoutOrDelivery,
        ],
    },
    LexiconEntry {
        token: "cozy",
        implies: &[VenueAttribute::DineIn, VenueAttribute::PriceAtMost(3)],
    },
    LexiconEntry {
        token: "lively",
        implies: &[VenueAttribute::ServesAlcohol, VenueAttribute::DineIn],
    },
    LexiconEntry {
        token: "quiet",
        implies: &[VenueAttribute::PriceAtLeast(2), VenueAttribute::DineIn],
    },
];

pub const EVENT_LEXICON: &[LexiconEntry] = &[
    LexiconEntry {
        token: "dating",
        implies: &[VenueAttribute::ServesDinner, VenueAttribute::Reservable],
    },
    LexiconEntry {
        token: "business",
        implies: &[
            VenueAttribute::Reservable,
            VenueAttribute::DineIn,
            VenueAttribute::PriceAtLeast(2),
        ],
    },
    LexiconEntry {
        token: "gathering",
        implies: &[
            VenueAttribute::DeliveryOrDineIn,
            VenueAttribute::PriceAtMost(3),
        ],
    },
    LexiconEntry {
        token: "celebration",
        implies: &[
            VenueAttribute::ServesAlcohol,
            VenueAttribute::PriceAtLeast(3),
        ],
    },
    LexiconEntry {
        token: "family",
        implies: &[
            VenueAttribute::DineIn,
            VenueAttribute::ServesLunch,
            VenueAttribute::PriceAtMost(3),
        ],
    },
];

/// Case-insensitive token lookup. Unknown tokens are not an error, the caller
/// falls back to a neutral score.
pub fn lookup<'a>(lexicon: &'a [LexiconEntry], token: &str) -> Option<&'a LexiconEntry> {
    let token = token.trim();
    lexicon.iter().find(|entry| entry.token.eq_ignore_ascii_case(token))
}
