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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use scoped_pool::Pool;

use crate::catalog::MovieCatalog;
use crate::model::Scorer;

/// Result type used to find the top-k movies for a user via a binary heap. The position is the
/// index of the movie in the catalog.
#[derive(Debug,Clone,Copy)]
pub struct ScoredMovie {
    pub movie_id: i32,
    pub score: f32,
    pub position: usize,
}

/// Ordering for our max-heap, the "greatest" element is the one ranked last. Higher scores come
/// first, equal scores keep their catalog order and NaN scores are ranked after all numbers.
fn cmp_rank(scored_movie_a: &ScoredMovie, scored_movie_b: &ScoredMovie) -> Ordering {
    let by_score = match (scored_movie_a.score.is_nan(), scored_movie_b.score.is_nan()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
        (false, false) => scored_movie_b.score
            .partial_cmp(&scored_movie_a.score)
            .unwrap_or(Ordering::Equal),
    };

    by_score
        .then(scored_movie_a.position.cmp(&scored_movie_b.position))
        .then(scored_movie_a.movie_id.cmp(&scored_movie_b.movie_id))
}

impl PartialEq for ScoredMovie {
    fn eq(&self, other: &Self) -> bool {
        cmp_rank(self, other) == Ordering::Equal
    }
}

impl Eq for ScoredMovie {}

impl Ord for ScoredMovie {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_rank(self, other)
    }
}

impl PartialOrd for ScoredMovie {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_rank(self, other))
    }
}

/// Selects the `k` best ranked movies, best first.
pub fn select_top_k<I>(scored_movies: I, k: usize) -> Vec<ScoredMovie>
    where I: IntoIterator<Item=ScoredMovie> {

    if k == 0 {
        return Vec::new();
    }

    let scored_movies = scored_movies.into_iter();
    let (lower_bound, _) = scored_movies.size_hint();

    let mut heap = BinaryHeap::with_capacity(k.min(lower_bound));

    for scored_movie in scored_movies {
        if heap.len() < k {
            heap.push(scored_movie);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_movie < *top {
                *top = scored_movie;
            }
        }
    }

    heap.into_sorted_vec()
}

/// Scores every movie in the catalog for the user and returns the `k` best.
pub fn top_k<S>(model: &S, catalog: &MovieCatalog, user_id: i32, k: usize) -> Vec<ScoredMovie>
    where S: Scorer + ?Sized {

    let scored_movies = catalog.iter()
        .enumerate()
        .map(|(position, movie)| {
            ScoredMovie { movie_id: movie.id, score: model.score(user_id, movie.id), position }
        });

    select_top_k(scored_movies, k.min(catalog.len()))
}

/// Same result as `top_k`, but the catalog is scored in chunks on the threads of the pool.
pub fn top_k_parallel<S>(
    pool: &Pool,
    model: &S,
    catalog: &MovieCatalog,
    user_id: i32,
    k: usize,
) -> Vec<ScoredMovie>
    where S: Scorer + Sync + ?Sized {

    let movies = catalog.movies();

    if movies.is_empty() {
        return Vec::new();
    }

    let mut scores = vec![0.0_f32; movies.len()];
    let num_chunks = num_cpus::get().max(1);
    let chunk_size = (movies.len() + num_chunks - 1) / num_chunks;

    pool.scoped(|scope| {
        for (chunk_of_scores, chunk_of_movies) in
            scores.chunks_mut(chunk_size).zip(movies.chunks(chunk_size)) {

            scope.execute(move || {
                for (score, movie) in chunk_of_scores.iter_mut().zip(chunk_of_movies.iter()) {
                    *score = model.score(user_id, movie.id);
                }
            });
        }
    });

    let scored_movies = movies.iter()
        .zip(scores.into_iter())
        .enumerate()
        .map(|(position, (movie, score))| ScoredMovie { movie_id: movie.id, score, position });

    select_top_k(scored_movies, k.min(movies.len()))
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::types::MovieRow;

    fn scored(movie_id: i32, score: f32, position: usize) -> ScoredMovie {
        ScoredMovie { movie_id, score, position }
    }

    fn catalog_of(ids: &[i32]) -> MovieCatalog {
        let movies: Vec<MovieRow> = ids.iter()
            .map(|id| MovieRow { id: *id, title: format!("Movie {}", id) })
            .collect();

        MovieCatalog::from(movies)
    }

    fn ids(scored_movies: &[ScoredMovie]) -> Vec<i32> {
        scored_movies.iter().map(|scored_movie| scored_movie.movie_id).collect()
    }

    #[test]
    fn scored_movie_ordering() {
        let movie_a = scored(1, 0.5, 0);
        let movie_b = scored(2, 1.5, 1);
        let movie_c = scored(3, 0.5, 2);
        let movie_d = scored(4, std::f32::NAN, 3);

        assert!(movie_b < movie_a);
        assert!(movie_a < movie_c);
        assert!(movie_c < movie_d);
    }

    #[test]
    fn topk() {
        let movies = vec![
            scored(1, 0.5, 0),
            scored(2, 1.5, 1),
            scored(3, 0.3, 2),
            scored(4, 3.5, 3),
            scored(5, 2.5, 4),
        ];

        let top_3 = select_top_k(movies, 3);

        assert_eq!(ids(&top_3), vec![4, 5, 2]);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let movies = vec![
            scored(7, 1.0, 0),
            scored(3, 2.0, 1),
            scored(9, 1.0, 2),
            scored(1, 1.0, 3),
        ];

        assert_eq!(ids(&select_top_k(movies.clone(), 3)), vec![3, 7, 9]);
        assert_eq!(ids(&select_top_k(movies, 4)), vec![3, 7, 9, 1]);
    }

    #[test]
    fn nan_scores_come_last() {
        let movies = vec![
            scored(1, std::f32::NAN, 0),
            scored(2, -10.0, 1),
            scored(3, std::f32::NAN, 2),
        ];

        assert_eq!(ids(&select_top_k(movies, 3)), vec![2, 1, 3]);
    }

    #[test]
    fn nan_scores_equal_themselves() {
        let movie = scored(4, std::f32::NAN, 3);

        assert_eq!(movie, movie);
        assert_eq!(movie.cmp(&movie), Ordering::Equal);
        assert!(movie != scored(5, std::f32::NAN, 3));
    }

    #[test]
    fn huge_k_is_bounded_by_the_catalog() {
        let pool = Pool::new(2);
        let catalog = catalog_of(&[10]);
        let model = |user_id: i32, movie_id: i32| (movie_id - user_id) as f32;

        assert_eq!(ids(&top_k(&model, &catalog, 1, usize::MAX)), vec![10]);
        assert_eq!(ids(&top_k_parallel(&pool, &model, &catalog, 1, usize::MAX)), vec![10]);

        let unbounded = (0..3).map(|position| scored(position as i32, 1.0, position));
        assert_eq!(select_top_k(unbounded, usize::MAX).len(), 3);

        pool.shutdown();
    }

    #[test]
    fn zero_k_yields_nothing() {
        assert!(select_top_k(vec![scored(1, 1.0, 0)], 0).is_empty());
    }

    #[test]
    fn never_more_results_than_movies() {
        let catalog = catalog_of(&[10, 20, 30]);
        let model = |user_id: i32, movie_id: i32| (movie_id - user_id) as f32;

        let top_5 = top_k(&model, &catalog, 1, 5);

        assert_eq!(ids(&top_5), vec![30, 20, 10]);
        assert_eq!(top_5[0].score, 29.0);
    }

    #[test]
    fn parallel_scoring_matches_sequential() {
        let pool = Pool::new(3);

        let movie_ids: Vec<i32> = (0..100).map(|id| (id * 37) % 101).collect();
        let catalog = catalog_of(&movie_ids);
        let model = |user_id: i32, movie_id: i32| ((movie_id * user_id) % 13) as f32;

        for &k in &[0, 1, 5, 100, 200] {
            assert_eq!(
                top_k_parallel(&pool, &model, &catalog, 3, k),
                top_k(&model, &catalog, 3, k),
            );
        }

        assert!(top_k_parallel(&pool, &model, &catalog_of(&[]), 3, 5).is_empty());

        pool.shutdown();
    }
}
