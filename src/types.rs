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

/// A single observed rating. Also used as a prediction query, in which case the label is ignored.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RatingRecord {
    pub user_id: i32,
    pub movie_id: i32,
    pub label: f32,
}

impl RatingRecord {

    pub fn new(user_id: i32, movie_id: i32, label: f32) -> Self {
        RatingRecord { user_id, movie_id, label }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct MovieRow {
    pub id: i32,
    pub title: String,
}

/// Row-major dense matrix of latent factors, one row of `rank` floats per key.
pub type FactorMatrix = Vec<f32>;

/// Returns `None` if the matrix would not fit into memory.
pub fn new_factor_matrix(num_rows: usize, rank: usize) -> Option<FactorMatrix> {
    let num_values = num_rows.checked_mul(rank)?;

    let mut matrix = FactorMatrix::new();
    matrix.try_reserve_exact(num_values).ok()?;
    matrix.resize(num_values, 0.0);

    Some(matrix)
}
