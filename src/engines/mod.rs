pub mod booking_engine;
pub mod mood_lexicon;
pub mod recommendation_engine;
