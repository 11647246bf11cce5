use scoped_pool::Pool;
use tracing::info;

use crate::catalog::MovieCatalog;
use crate::error::{EvaluationError, TrainingError};
use crate::metrics::{self, RegressionMetrics};
use crate::model::{Scorer, Trainer};
use crate::ranking::{self, ScoredMovie};
use crate::types::RatingRecord;

/// Fits a model with the given trainer and answers queries against it. The trainer is the only
/// part which knows how scores come about.
pub struct RecommendationPipeline<T: Trainer> {
    trainer: T,
}

impl<T: Trainer> RecommendationPipeline<T> {

    pub fn new(trainer: T) -> Self {
        RecommendationPipeline { trainer }
    }

    pub fn train(&self, ratings: &[RatingRecord]) -> Result<T::Model, TrainingError> {
        info!("Fitting model to {} ratings", ratings.len());
        self.trainer.fit(ratings)
    }

    /// Metrics are only reported, a poor fit never stops the pipeline.
    pub fn evaluate(
        &self,
        model: &T::Model,
        ratings: &[RatingRecord],
    ) -> Result<RegressionMetrics, EvaluationError> {

        let metrics = metrics::evaluate(model, ratings)?;

        info!(
            "Evaluated {} ratings: RMSE {:.4}, MAE {:.4}, R² {:.4}",
            metrics.num_evaluated,
            metrics.root_mean_squared_error,
            metrics.mean_absolute_error,
            metrics.r_squared,
        );

        Ok(metrics)
    }

    pub fn score_one(&self, model: &T::Model, user_id: i32, movie_id: i32) -> f32 {
        model.score(user_id, movie_id)
    }

    pub fn top_k(
        &self,
        model: &T::Model,
        catalog: &MovieCatalog,
        user_id: i32,
        k: usize,
    ) -> Vec<ScoredMovie> {
        ranking::top_k(model, catalog, user_id, k)
    }

    pub fn top_k_parallel(
        &self,
        pool: &Pool,
        model: &T::Model,
        catalog: &MovieCatalog,
        user_id: i32,
        k: usize,
    ) -> Vec<ScoredMovie>
        where T::Model: Sync {
        ranking::top_k_parallel(pool, model, catalog, user_id, k)
    }
}
