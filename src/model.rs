use crate::error::TrainingError;
use crate::types::RatingRecord;

/// A fitted model which predicts how much a user would like a movie.
pub trait Scorer {
    fn score(&self, user_id: i32, movie_id: i32) -> f32;
}

/// Fits a model to observed ratings.
pub trait Trainer {
    type Model: Scorer;

    fn fit(&self, ratings: &[RatingRecord]) -> Result<Self::Model, TrainingError>;
}

impl<F> Scorer for F where F: Fn(i32, i32) -> f32 {
    fn score(&self, user_id: i32, movie_id: i32) -> f32 {
        self(user_id, movie_id)
    }
}
