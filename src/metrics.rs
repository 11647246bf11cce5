use std::fmt;

use tracing::warn;

use crate::error::EvaluationError;
use crate::model::Scorer;
use crate::types::RatingRecord;

/// Regression quality of a model's predictions against observed ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionMetrics {
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
    pub root_mean_squared_error: f64,
    /// NaN if all observed ratings are identical
    pub r_squared: f64,
    /// Squared loss, averaged over the evaluated ratings
    pub loss_function: f64,
    pub num_evaluated: usize,
    /// Ratings for which the model had no finite prediction, e.g. unseen users
    pub num_skipped: usize,
}

pub fn evaluate<S>(model: &S, ratings: &[RatingRecord])
    -> Result<RegressionMetrics, EvaluationError>
    where S: Scorer + ?Sized {

    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(ratings.len());
    let mut num_skipped = 0;

    for rating in ratings {
        let prediction = model.score(rating.user_id, rating.movie_id);

        if prediction.is_finite() && rating.label.is_finite() {
            pairs.push((prediction as f64, rating.label as f64));
        } else {
            num_skipped += 1;
        }
    }

    if pairs.is_empty() {
        return Err(EvaluationError::NoPredictions);
    }

    if num_skipped > 0 {
        warn!("Skipped {} ratings without a finite prediction during evaluation", num_skipped);
    }

    let n = pairs.len() as f64;

    let mean_label = pairs.iter().map(|(_, label)| label).sum::<f64>() / n;

    let mut absolute_error_sum = 0.0;
    let mut squared_error_sum = 0.0;
    let mut total_sum_of_squares = 0.0;

    for (prediction, label) in pairs.iter() {
        let error = label - prediction;
        absolute_error_sum += error.abs();
        squared_error_sum += error * error;
        total_sum_of_squares += (label - mean_label) * (label - mean_label);
    }

    let mean_squared_error = squared_error_sum / n;

    let r_squared = if total_sum_of_squares > 0.0 {
        1.0 - squared_error_sum / total_sum_of_squares
    } else {
        std::f64::NAN
    };

    Ok(RegressionMetrics {
        mean_absolute_error: absolute_error_sum / n,
        mean_squared_error,
        root_mean_squared_error: mean_squared_error.sqrt(),
        r_squared,
        loss_function: mean_squared_error,
        num_evaluated: pairs.len(),
        num_skipped,
    })
}

impl fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  Mean absolute error:     {:.4}", self.mean_absolute_error)?;
        writeln!(f, "  Mean squared error:      {:.4}", self.mean_squared_error)?;
        writeln!(f, "  Root mean squared error: {:.4}", self.root_mean_squared_error)?;
        writeln!(f, "  R squared:               {:.4}", self.r_squared)?;
        write!(f, "  Evaluated ratings:       {} ({} skipped)", self.num_evaluated, self.num_skipped)
    }
}
