/**
 * MovieRecommender
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::time::Instant;

use rand::{Rng, XorShiftRng};
use tracing::{debug, info};

use crate::error::TrainingError;
use crate::model::{Scorer, Trainer};
use crate::stats::DataDictionary;
use crate::types::{self, FactorMatrix, RatingRecord};
use crate::utils;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerOptions {
    /// Number of latent factors per user and movie
    pub rank: usize,
    /// Number of passes over the ratings
    pub iterations: usize,
    pub learning_rate: f32,
    /// L2 regularization of the factors
    pub lambda: f32,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        TrainerOptions {
            rank: 100,
            iterations: 20,
            learning_rate: 0.05,
            lambda: 0.05,
        }
    }
}

impl TrainerOptions {

    fn validate(&self) -> Result<(), TrainingError> {
        if self.rank == 0 {
            return Err(TrainingError::InvalidOptions("rank must be positive".to_string()));
        }

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainingError::InvalidOptions(
                format!("learning rate must be positive, got {}", self.learning_rate)));
        }

        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(TrainingError::InvalidOptions(
                format!("lambda must not be negative, got {}", self.lambda)));
        }

        Ok(())
    }
}

/// Factorizes the rating matrix R into user factors P and movie factors Q such that
/// R ≈ P Qᵀ, via stochastic gradient descent over the observed ratings. Users and movies are
/// treated as categorical keys. We shuffle with a fixed-seed generator, so training the same
/// data twice yields the same model.
pub struct MatrixFactorization {
    options: TrainerOptions,
}

impl MatrixFactorization {

    pub fn new(options: TrainerOptions) -> Self {
        MatrixFactorization { options }
    }

    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }
}

impl Default for MatrixFactorization {
    fn default() -> Self {
        MatrixFactorization::new(TrainerOptions::default())
    }
}

pub struct FactorModel {
    data_dict: DataDictionary,
    rank: usize,
    user_factors: FactorMatrix,
    movie_factors: FactorMatrix,
}

impl FactorModel {

    pub fn data_dictionary(&self) -> &DataDictionary {
        &self.data_dict
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    fn user_row(&self, user_key: u32) -> &[f32] {
        let start = user_key as usize * self.rank;
        &self.user_factors[start..start + self.rank]
    }

    fn movie_row(&self, movie_key: u32) -> &[f32] {
        let start = movie_key as usize * self.rank;
        &self.movie_factors[start..start + self.rank]
    }
}

impl Scorer for FactorModel {

    /// Users or movies which did not occur in the training data have no factors, for them we
    /// answer NaN.
    fn score(&self, user_id: i32, movie_id: i32) -> f32 {
        match (self.data_dict.user_key(user_id), self.data_dict.movie_key(movie_id)) {
            (Some(user_key), Some(movie_key)) =>
                dot(self.user_row(user_key), self.movie_row(movie_key)),
            _ => f32::NAN,
        }
    }
}

impl Trainer for MatrixFactorization {

    type Model = FactorModel;

    fn fit(&self, ratings: &[RatingRecord]) -> Result<FactorModel, TrainingError> {

        self.options.validate()?;

        if ratings.is_empty() {
            return Err(TrainingError::NoRatings);
        }

        if let Some((index, rating)) = ratings.iter()
            .enumerate()
            .find(|(_, rating)| !rating.label.is_finite()) {
            return Err(TrainingError::InvalidLabel { index, label: rating.label });
        }

        let data_dict = DataDictionary::from_ratings(ratings.iter());

        info!(
            "Training on {} ratings between {} users and {} movies, rank {}, {} iterations",
            data_dict.num_ratings(),
            data_dict.num_users(),
            data_dict.num_movies(),
            self.options.rank,
            self.options.iterations,
        );

        // Both lookups succeed, the dictionary was built from these ratings
        let keyed_ratings: Vec<(usize, usize, f32)> = ratings.iter()
            .filter_map(|rating| {
                let user_key = data_dict.user_key(rating.user_id)?;
                let movie_key = data_dict.movie_key(rating.movie_id)?;
                Some((user_key as usize, movie_key as usize, rating.label))
            })
            .collect();

        let rank = self.options.rank;
        let learning_rate = self.options.learning_rate;
        let lambda = self.options.lambda;

        let mut rng = XorShiftRng::new_unseeded();

        let too_large = || TrainingError::InvalidOptions(format!(
            "rank {} is too large for {} users and {} movies",
            rank, data_dict.num_users(), data_dict.num_movies()));

        let mut user_factors = types::new_factor_matrix(data_dict.num_users(), rank)
            .ok_or_else(too_large)?;
        let mut movie_factors = types::new_factor_matrix(data_dict.num_movies(), rank)
            .ok_or_else(too_large)?;

        // Initial dot products are around 0.25, independent of the rank
        let scale = (1.0 / rank as f32).sqrt();
        for value in user_factors.iter_mut().chain(movie_factors.iter_mut()) {
            *value = rng.gen::<f32>() * scale;
        }

        let mut order: Vec<usize> = (0..keyed_ratings.len()).collect();

        let training_start = Instant::now();

        for iteration in 0..self.options.iterations {

            rng.shuffle(&mut order);

            let mut squared_error_sum = 0.0_f64;

            for &index in order.iter() {
                let (user_key, movie_key, label) = keyed_ratings[index];

                let user_row = &mut user_factors[user_key * rank..(user_key + 1) * rank];
                let movie_row = &mut movie_factors[movie_key * rank..(movie_key + 1) * rank];

                let error = label - dot(user_row, movie_row);
                squared_error_sum += (error * error) as f64;

                for (p, q) in user_row.iter_mut().zip(movie_row.iter_mut()) {
                    let previous_p = *p;
                    *p += learning_rate * (error * *q - lambda * previous_p);
                    *q += learning_rate * (error * previous_p - lambda * *q);
                }
            }

            let training_rmse = (squared_error_sum / keyed_ratings.len() as f64).sqrt();

            if !training_rmse.is_finite() {
                return Err(TrainingError::Diverged { iteration });
            }

            debug!("Iteration {}: training RMSE {:.4}", iteration, training_rmse);
        }

        info!("{}ms training time", utils::to_millis(training_start.elapsed()));

        Ok(FactorModel { data_dict, rank, user_factors, movie_factors })
    }
}

#[inline(always)]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {

    use super::*;

    fn small_options() -> TrainerOptions {
        TrainerOptions { rank: 8, iterations: 200, learning_rate: 0.05, lambda: 0.01 }
    }

    fn polarized_ratings() -> Vec<RatingRecord> {
        let mut ratings = Vec::new();
        for user in 1..6 {
            ratings.push(RatingRecord::new(user, 10, 5.0));
            ratings.push(RatingRecord::new(user, 20, 1.0));
        }
        ratings.push(RatingRecord::new(6, 10, 5.0));
        ratings
    }

    #[test]
    fn learns_preferences() {
        let model = MatrixFactorization::new(small_options()).fit(&polarized_ratings()).unwrap();

        assert!((model.score(1, 10) - 5.0).abs() < 0.5);
        assert!((model.score(1, 20) - 1.0).abs() < 0.5);
        assert!(model.score(6, 10) > model.score(6, 20));
    }

    #[test]
    fn unknown_keys_score_nan() {
        let model = MatrixFactorization::new(small_options()).fit(&polarized_ratings()).unwrap();

        assert!(model.score(99, 10).is_nan());
        assert!(model.score(1, 99).is_nan());
        assert!(model.score(1, 10).is_finite());
    }

    #[test]
    fn training_is_deterministic() {
        let trainer = MatrixFactorization::new(small_options());
        let ratings = polarized_ratings();

        let model_a = trainer.fit(&ratings).unwrap();
        let model_b = trainer.fit(&ratings).unwrap();

        for user in 1..7 {
            for &movie in &[10, 20] {
                assert_eq!(model_a.score(user, movie), model_b.score(user, movie));
            }
        }
    }

    #[test]
    fn ids_are_categorical() {
        let ratings = vec![
            RatingRecord::new(1, 1, 5.0),
            RatingRecord::new(1000, 1, 5.0),
            RatingRecord::new(1, 2000, 1.0),
        ];

        let model = MatrixFactorization::new(small_options()).fit(&ratings).unwrap();

        assert_eq!(model.data_dictionary().num_users(), 2);
        assert_eq!(model.data_dictionary().num_movies(), 2);
        assert!(model.score(1000, 2000).is_finite());
        assert!(model.score(2, 1).is_nan());
    }

    #[test]
    fn rejects_empty_ratings() {
        match MatrixFactorization::default().fit(&[]) {
            Err(TrainingError::NoRatings) => {},
            Err(other) => panic!("Expected NoRatings, got {:?}", other),
            Ok(_) => panic!("Expected NoRatings"),
        }
    }

    #[test]
    fn rejects_non_finite_labels() {
        let ratings = vec![RatingRecord::new(1, 1, 5.0), RatingRecord::new(2, 1, f32::NAN)];

        match MatrixFactorization::default().fit(&ratings) {
            Err(TrainingError::InvalidLabel { index: 1, .. }) => {},
            Err(other) => panic!("Expected InvalidLabel, got {:?}", other),
            Ok(_) => panic!("Expected InvalidLabel"),
        }
    }

    #[test]
    fn rejects_invalid_options() {
        let options = TrainerOptions { rank: 0, ..TrainerOptions::default() };
        let ratings = vec![RatingRecord::new(1, 1, 5.0)];

        assert!(MatrixFactorization::new(options).fit(&ratings).is_err());

        let options = TrainerOptions { learning_rate: -0.1, ..TrainerOptions::default() };
        assert!(MatrixFactorization::new(options).fit(&ratings).is_err());
    }

    #[test]
    fn rejects_rank_beyond_memory() {
        let options = TrainerOptions { rank: usize::MAX / 2, ..TrainerOptions::default() };
        let ratings = vec![
            RatingRecord::new(1, 1, 5.0),
            RatingRecord::new(2, 1, 4.0),
            RatingRecord::new(3, 2, 1.0),
        ];

        match MatrixFactorization::new(options).fit(&ratings) {
            Err(TrainingError::InvalidOptions(message)) => assert!(message.contains("too large")),
            Err(other) => panic!("Expected InvalidOptions, got {:?}", other),
            Ok(_) => panic!("Expected InvalidOptions"),
        }
    }

    #[test]
    fn reports_divergence() {
        let options = TrainerOptions { rank: 4, iterations: 50, learning_rate: 50.0, lambda: 0.0 };
        let ratings = polarized_ratings();

        match MatrixFactorization::new(options).fit(&ratings) {
            Err(TrainingError::Diverged { .. }) => {},
            Err(other) => panic!("Expected Diverged, got {:?}", other),
            Ok(_) => panic!("Expected Diverged"),
        }
    }
}
