use crate::engines::mood_lexicon::{lookup, LexiconEntry, EVENT_LEXICON, MOOD_LEXICON};
use crate::models::recommendation::Recommendation;
use crate::models::restaurant::{RestaurantRecord, SearchCriteria};

#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub quality: f64,
    pub price_fit: f64,
    pub mood: f64,
    pub event: f64,
    pub proximity: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.quality + self.price_fit + self.mood + self.event + self.proximity
    }
}

pub const DEFAULT_WEIGHTS: ScoreWeights = ScoreWeights {
    quality: 0.30,
    price_fit: 0.15,
    mood: 0.175,
    event: 0.175,
    proximity: 0.20,
};

const NEUTRAL_QUALITY: f64 = 5.0;
const NEUTRAL_PRICE_FIT: f64 = 7.0;
const NEUTRAL_LEXICON_FIT: f64 = 5.0;
const NEUTRAL_PROXIMITY: f64 = 10.0;

/// Review-count bonus reaches its +1.0 cap at roughly 800 reviews.
const REVIEW_CONFIDENCE_FACTOR: f64 = 0.15;
const REVIEW_CONFIDENCE_CAP: f64 = 1.0;

/// A factor only shows up in the reasoning when it moved the needle.
const REASONING_THRESHOLD: f64 = 1.0;

/// Fraction of the search radius inside which proximity scores full marks.
const NEARBY_FRACTION: f64 = 0.2;

struct FactorScore {
    value: f64,
    neutral: f64,
    detail: String,
}

impl FactorScore {
    fn drove_the_ranking(&self) -> bool {
        (self.value - self.neutral).abs() > REASONING_THRESHOLD
    }
}

struct ScoredCandidate {
    restaurant: RestaurantRecord,
    composite: f64,
    factors: [FactorScore; 5],
    mood_match: f64,
    suitability_for_event: f64,
}

pub struct RecommendationEngine {
    weights: ScoreWeights,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
        }
    }

    /// Scores and ranks a snapshot of place records against the criteria.
    /// Pure: identical inputs always produce identical, identically ordered
    /// output, and an empty snapshot yields an empty list.
    pub fn rank(
        &self,
        restaurants: &[RestaurantRecord],
        criteria: &SearchCriteria,
    ) -> Vec<Recommendation> {
        let mut candidates: Vec<ScoredCandidate> = restaurants
            .iter()
            .map(|restaurant| self.score_candidate(restaurant, criteria))
            .collect();

        // Total order: composite, then rating (absent last), then review
        // count, then name, so equal inputs can never reorder.
        candidates.sort_by(|a, b| {
            b.composite
                .total_cmp(&a.composite)
                .then_with(|| {
                    let a_rating = a.restaurant.rating.unwrap_or(f64::NEG_INFINITY);
                    let b_rating = b.restaurant.rating.unwrap_or(f64::NEG_INFINITY);
                    b_rating.total_cmp(&a_rating)
                })
                .then_with(|| {
                    b.restaurant
                        .user_ratings_total
                        .cmp(&a.restaurant.user_ratings_total)
                })
                .then_with(|| a.restaurant.name.cmp(&b.restaurant.name))
        });

        candidates
            .into_iter()
            .map(|candidate| {
                let reasoning = candidate
                    .factors
                    .iter()
                    .filter(|factor| factor.drove_the_ranking())
                    .map(|factor| factor.detail.clone())
                    .collect();

                Recommendation {
                    restaurant: candidate.restaurant,
                    score: round_one_decimal(candidate.composite),
                    reasoning,
                    suitability_for_event: round_one_decimal(candidate.suitability_for_event),
                    mood_match: round_one_decimal(candidate.mood_match),
                }
            })
            .collect()
    }

    fn score_candidate(
        &self,
        restaurant: &RestaurantRecord,
        criteria: &SearchCriteria,
    ) -> ScoredCandidate {
        let quality = self.score_quality(restaurant);
        let price_fit = self.score_price_fit(restaurant, criteria);
        let mood = self.score_lexicon_fit(restaurant, MOOD_LEXICON, &criteria.mood, "mood");
        let event = self.score_lexicon_fit(restaurant, EVENT_LEXICON, &criteria.event, "occasion");
        let proximity = self.score_proximity(restaurant, criteria);

        let composite = quality.value * self.weights.quality
            + price_fit.value * self.weights.price_fit
            + mood.value * self.weights.mood
            + event.value * self.weights.event
            + proximity.value * self.weights.proximity;

        let mood_match = mood.value;
        let suitability_for_event = event.value;

        ScoredCandidate {
            restaurant: restaurant.clone(),
            composite,
            factors: [quality, price_fit, mood, event, proximity],
            mood_match,
            suitability_for_event,
        }
    }

    fn score_quality(&self, restaurant: &RestaurantRecord) -> FactorScore {
        let (value, detail) = match restaurant.rating {
            Some(rating) => {
                let confidence_bonus = ((1.0 + restaurant.user_ratings_total as f64).ln()
                    * REVIEW_CONFIDENCE_FACTOR)
                    .min(REVIEW_CONFIDENCE_CAP);
                let value = (rating * 2.0 + confidence_bonus).clamp(0.0, 10.0);
                let detail = format!(
                    "Rated {:.1}/5 across {} reviews",
                    rating, restaurant.user_ratings_total
                );
                (value, detail)
            }
            None => (NEUTRAL_QUALITY, "No rating information yet".to_string()),
        };

        FactorScore {
            value,
            neutral: NEUTRAL_QUALITY,
            detail,
        }
    }

    fn score_price_fit(
        &self,
        restaurant: &RestaurantRecord,
        criteria: &SearchCriteria,
    ) -> FactorScore {
        let (value, detail) = match (restaurant.price_level, criteria.price_level) {
            (Some(actual), Some(wanted)) => {
                let difference = (i16::from(actual) - i16::from(wanted)).abs() as f64;
                let value = (10.0 - 2.5 * difference).clamp(0.0, 10.0);
                let detail = if actual == wanted {
                    "Price level matches the requested budget".to_string()
                } else {
                    format!("Price level {} against a requested {}", actual, wanted)
                };
                (value, detail)
            }
            _ => (
                NEUTRAL_PRICE_FIT,
                "No price preference applied".to_string(),
            ),
        };

        FactorScore {
            value,
            neutral: NEUTRAL_PRICE_FIT,
            detail,
        }
    }

    fn score_lexicon_fit(
        &self,
        restaurant: &RestaurantRecord,
        lexicon: &[LexiconEntry],
        token: &str,
        axis: &str,
    ) -> FactorScore {
        let (value, detail) = match lookup(lexicon, token) {
            Some(entry) => {
                let implied = entry.implies.len();
                let satisfied = entry
                    .implies
                    .iter()
                    .filter(|attribute| attribute.satisfied_by(restaurant))
                    .count();
                let value = 10.0 * satisfied as f64 / implied as f64;
                let detail = format!(
                    "Fits a \"{}\" {} ({} of {} expected traits)",
                    entry.token, axis, satisfied, implied
                );
                (value, detail)
            }
            None => (
                NEUTRAL_LEXICON_FIT,
                format!("\"{}\" is not a recognized {}", token.trim(), axis),
            ),
        };

        FactorScore {
            value,
            neutral: NEUTRAL_LEXICON_FIT,
            detail,
        }
    }

    fn score_proximity(
        &self,
        restaurant: &RestaurantRecord,
        criteria: &SearchCriteria,
    ) -> FactorScore {
        let (value, detail) = match restaurant.distance {
            None => (NEUTRAL_PROXIMITY, "Distance not reported".to_string()),
            Some(distance) => {
                let nearby_cutoff = criteria.radius * NEARBY_FRACTION;
                if distance <= nearby_cutoff {
                    (10.0, format!("Only {:.0} m away", distance))
                } else if distance >= criteria.radius {
                    // Should have been filtered upstream, scored instead of
                    // rejected so a stray record cannot fail the request.
                    (
                        0.0,
                        format!("{:.0} m away, outside the search radius", distance),
                    )
                } else {
                    let value = (10.0 * (criteria.radius - distance)
                        / (criteria.radius - nearby_cutoff))
                        .clamp(0.0, 10.0);
                    (
                        value,
                        format!(
                            "{:.0} m away within a {:.0} m search radius",
                            distance, criteria.radius
                        ),
                    )
                }
            }
        };

        FactorScore {
            value,
            neutral: NEUTRAL_PROXIMITY,
            detail,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn romantic_criteria() -> SearchCriteria {
        SearchCriteria {
            latitude: Some(1.3000),
            longitude: Some(103.8500),
            place_name: None,
            cuisine_types: vec![],
            keyword: None,
            mood: "romantic".to_string(),
            event: "dating".to_string(),
            radius: 2000.0,
            price_level: Some(3),
            locale: "en".to_string(),
        }
    }

    fn candlelit_bistro() -> RestaurantRecord {
        RestaurantRecord {
            place_id: "bistro-1".to_string(),
            name: "Lumiere".to_string(),
            address: "12 Keong Saik Rd".to_string(),
            rating: Some(4.5),
            user_ratings_total: 800,
            price_level: Some(3),
            reservable: Some(true),
            dine_in: Some(true),
            serves_dinner: Some(true),
            serves_wine: Some(true),
            distance: Some(500.0),
            ..RestaurantRecord::default()
        }
    }

    #[test]
    fn weights_sum_to_one() {
        assert!((DEFAULT_WEIGHTS.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_ranks_to_empty_output() {
        let engine = RecommendationEngine::new();
        assert!(engine.rank(&[], &romantic_criteria()).is_empty());
    }

    #[test]
    fn well_matched_bistro_scores_in_the_upper_range() {
        let engine = RecommendationEngine::new();
        let ranked = engine.rank(&[candlelit_bistro()], &romantic_criteria());

        assert_eq!(ranked.len(), 1);
        let top = &ranked[0];
        assert!(top.score > 8.5, "score was {}", top.score);
        assert!(top.mood_match >= 8.0);
        assert!(top.suitability_for_event >= 8.0);
        assert!(top.reasoning.iter().any(|r| r.contains("Rated 4.5/5")));
        assert!(top.reasoning.iter().any(|r| r.contains("romantic")));
        assert!(top.reasoning.iter().any(|r| r.contains("dating")));
    }

    #[test]
    fn scores_stay_inside_bounds_for_sparse_records() {
        let engine = RecommendationEngine::new();
        let stray = RestaurantRecord {
            place_id: "stray-1".to_string(),
            name: "Nameless Kopitiam".to_string(),
            distance: Some(5000.0),
            ..RestaurantRecord::default()
        };
        let ranked = engine.rank(&[stray, candlelit_bistro()], &romantic_criteria());

        for recommendation in &ranked {
            assert!((0.0..=10.0).contains(&recommendation.score));
            assert!((0.0..=10.0).contains(&recommendation.mood_match));
            assert!((0.0..=10.0).contains(&recommendation.suitability_for_event));
        }
    }

    #[test]
    fn output_is_sorted_non_increasing_by_score() {
        let engine = RecommendationEngine::new();
        let mut mediocre = candlelit_bistro();
        mediocre.place_id = "bistro-2".to_string();
        mediocre.name = "Middling".to_string();
        mediocre.rating = Some(3.1);
        mediocre.user_ratings_total = 12;

        let ranked = engine.rank(
            &[mediocre, candlelit_bistro()],
            &romantic_criteria(),
        );

        assert_eq!(ranked[0].restaurant.name, "Lumiere");
        assert!(ranked[0].score >= ranked[1].score);
    }

    #[test]
    fn equal_scores_tie_break_on_name() {
        let engine = RecommendationEngine::new();
        let mut twin_b = candlelit_bistro();
        twin_b.place_id = "bistro-b".to_string();
        twin_b.name = "Zest".to_string();
        let mut twin_a = candlelit_bistro();
        twin_a.place_id = "bistro-a".to_string();
        twin_a.name = "Aroma".to_string();

        let ranked = engine.rank(&[twin_b, twin_a], &romantic_criteria());
        assert_eq!(ranked[0].restaurant.name, "Aroma");
        assert_eq!(ranked[1].restaurant.name, "Zest");
    }

    #[test]
    fn missing_rating_sorts_after_equal_composite_with_rating() {
        let engine = RecommendationEngine::new();

        // A 2.5-rated venue with no reviews lands exactly on the neutral 5.0
        // an unrated venue gets, so the two composites tie.
        let mut unrated = RestaurantRecord {
            place_id: "unrated".to_string(),
            name: "Aaa Unrated".to_string(),
            ..RestaurantRecord::default()
        };
        unrated.rating = None;
        let mut rated = unrated.clone();
        rated.place_id = "rated".to_string();
        rated.name = "Zzz Rated".to_string();
        rated.rating = Some(2.5);
        rated.user_ratings_total = 0;

        let criteria = SearchCriteria {
            price_level: None,
            ..romantic_criteria()
        };
        let ranked = engine.rank(&[unrated, rated], &criteria);

        // The rated venue wins the tie regardless of its later name.
        assert_eq!(ranked[0].restaurant.place_id, "rated");
    }

    #[test]
    fn missing_price_preference_never_penalizes() {
        let engine = RecommendationEngine::new();
        let criteria = SearchCriteria {
            price_level: Some(1),
            mood: "unknown-mood".to_string(),
            event: "unknown-event".to_string(),
            ..romantic_criteria()
        };

        let mut unpriced = candlelit_bistro();
        unpriced.place_id = "unpriced".to_string();
        unpriced.name = "Unpriced".to_string();
        unpriced.price_level = None;

        let mut expensive = candlelit_bistro();
        expensive.place_id = "expensive".to_string();
        expensive.name = "Expensive".to_string();
        expensive.price_level = Some(4);

        let ranked = engine.rank(&[expensive, unpriced], &criteria);
        assert_eq!(ranked[0].restaurant.name, "Unpriced");
    }

    #[test]
    fn unrecognized_tokens_fall_back_to_neutral() {
        let engine = RecommendationEngine::new();
        let criteria = SearchCriteria {
            mood: "melancholic".to_string(),
            event: "heist".to_string(),
            ..romantic_criteria()
        };
        let ranked = engine.rank(&[candlelit_bistro()], &criteria);

        assert_eq!(ranked[0].mood_match, 5.0);
        assert_eq!(ranked[0].suitability_for_event, 5.0);
    }

    #[test]
    fn proximity_decays_linearly_and_bottoms_out() {
        let engine = RecommendationEngine::new();
        let criteria = romantic_criteria();

        let mut near = candlelit_bistro();
        near.distance = Some(300.0);
        let mut mid = candlelit_bistro();
        mid.distance = Some(1200.0);
        let mut far = candlelit_bistro();
        far.distance = Some(2600.0);

        let near_score = engine.rank(&[near], &criteria)[0].score;
        let mid_score = engine.rank(&[mid], &criteria)[0].score;
        let far_score = engine.rank(&[far], &criteria)[0].score;

        assert!(near_score > mid_score);
        assert!(mid_score > far_score);
    }

    #[test]
    fn ranking_is_pure_and_repeatable() {
        let engine = RecommendationEngine::new();
        let criteria = romantic_criteria();
        let restaurants = vec![
            candlelit_bistro(),
            RestaurantRecord {
                place_id: "stall-7".to_string(),
                name: "Hawker Stall 7".to_string(),
                rating: Some(4.2),
                user_ratings_total: 95,
                price_level: Some(1),
                takeout: Some(true),
                distance: Some(150.0),
                ..RestaurantRecord::default()
            },
        ];

        let first = engine.rank(&restaurants, &criteria);
        let second = engine.rank(&restaurants, &criteria);

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn near_neutral_factors_stay_out_of_the_reasoning() {
        let engine = RecommendationEngine::new();
        // 500 m of a 2000 m radius scores 9.4, within 1.0 of the neutral 10.
        let ranked = engine.rank(&[candlelit_bistro()], &romantic_criteria());
        assert!(ranked[0]
            .reasoning
            .iter()
            .all(|reason| !reason.contains("search radius")));
    }
}
