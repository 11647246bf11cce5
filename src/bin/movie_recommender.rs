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

extern crate getopts;
extern crate movie_recommender;
extern crate num_cpus;
extern crate scoped_pool;

use std::env;
use std::io;
use std::io::prelude::*;
use std::process;
use std::str::FromStr;

use getopts::{Matches, Options};
use scoped_pool::Pool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use movie_recommender::input::{self, UserSelection};
use movie_recommender::{io as movie_io, MatrixFactorization, MovieCatalog, RecommendationPipeline,
    TrainerOptions};

const DEFAULT_NUM_RECOMMENDATIONS: usize = 5;

// GoldenEye
const DEFAULT_REFERENCE_MOVIE: i32 = 10;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

struct Settings {
    ratings_path: String,
    movies_path: String,
    user_id: Option<i32>,
    num_recommendations: usize,
    reference_movie: i32,
    trainer_options: TrainerOptions,
    output_path: Option<String>,
}

fn main() {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "ratings", &format!("Ratings file name (optional, defaults to {}). Comma \
        separated with a header line, the columns are user id, movie id and rating.",
        movie_io::DEFAULT_RATINGS_PATH), "PATH");
    opts.optopt("m", "movies", &format!("Movies file name (optional, defaults to {}). Comma \
        separated with a header line, the columns are movie id and title.",
        movie_io::DEFAULT_MOVIES_PATH), "PATH");
    opts.optopt("u", "user", "User to recommend for (optional, asks on stdin by default).", "ID");
    opts.optopt("n", "num-recommendations", "Number of movies to recommend (optional, defaults \
        to 5).", "NUMBER");
    opts.optopt("", "reference-movie", "Movie whose score is reported for the user (optional, \
        defaults to 10).", "ID");
    opts.optopt("i", "iterations", "Number of training iterations (optional, defaults to 20).",
        "NUMBER");
    opts.optopt("f", "factors", "Number of latent factors (optional, defaults to 100).", "NUMBER");
    opts.optopt("", "learning-rate", "Learning rate (optional, defaults to 0.05).", "NUMBER");
    opts.optopt("", "lambda", "Regularization (optional, defaults to 0.05).", "NUMBER");
    opts.optopt("o", "outputfile", "Also write the recommendations as JSON to this file \
        (optional).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        print_usage(&program, &opts, None);
        return;
    }

    let settings = match settings_from(&matches) {
        Ok(settings) => settings,
        Err(hint) => return print_usage_and_exit(&program, opts, Some(&hint)),
    };

    if let Err(failure) = recommend(settings) {
        eprintln!("\n{}\n", failure);
        process::exit(EXIT_FAILURE);
    }
}

fn option<T: FromStr>(matches: &Matches, name: &str, default: T) -> Result<T, String>
    where T::Err: ToString {

    matches.opt_get_default(name, default)
        .map_err(|failure| format!("Problem with option '{}': {}", name, failure.to_string()))
}

fn settings_from(matches: &Matches) -> Result<Settings, String> {

    let defaults = TrainerOptions::default();

    let trainer_options = TrainerOptions {
        rank: option(matches, "f", defaults.rank)?,
        iterations: option(matches, "i", defaults.iterations)?,
        learning_rate: option(matches, "learning-rate", defaults.learning_rate)?,
        lambda: option(matches, "lambda", defaults.lambda)?,
    };

    let user_id = match matches.opt_str("u") {
        Some(_) => Some(option(matches, "u", input::DEFAULT_USER_ID)?),
        None => None,
    };

    Ok(Settings {
        ratings_path: matches.opt_str("r")
            .unwrap_or_else(|| movie_io::DEFAULT_RATINGS_PATH.to_string()),
        movies_path: matches.opt_str("m")
            .unwrap_or_else(|| movie_io::DEFAULT_MOVIES_PATH.to_string()),
        user_id,
        num_recommendations: option(matches, "n", DEFAULT_NUM_RECOMMENDATIONS)?,
        reference_movie: option(matches, "reference-movie", DEFAULT_REFERENCE_MOVIE)?,
        trainer_options,
        output_path: matches.opt_str("o"),
    })
}

fn print_usage(program: &str, opts: &Options, hint: Option<&str>) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
}

fn print_usage_and_exit(program: &str, opts: Options, hint: Option<&str>) {
    print_usage(program, &opts, hint);
    process::exit(EXIT_USAGE);
}

fn recommend(settings: Settings) -> movie_recommender::Result<()> {

    info!("Reading ratings from {}", settings.ratings_path);
    let ratings = movie_io::read_ratings(&settings.ratings_path)?;

    info!("Reading movies from {}", settings.movies_path);
    let catalog = MovieCatalog::load(&settings.movies_path)?;

    info!("Found {} ratings and {} movies.", ratings.len(), catalog.len());

    let pipeline = RecommendationPipeline::new(MatrixFactorization::new(settings.trainer_options));

    let model = pipeline.train(&ratings)?;
    println!();

    let metrics = pipeline.evaluate(&model, &ratings)?;
    println!("Evaluation of the model on the training data:");
    println!("{}", metrics);
    println!();

    let stdin = io::stdin();
    let interactive = settings.user_id.is_none();

    let selection = match settings.user_id {
        Some(user_id) => UserSelection::Parsed(user_id),
        None => input::prompt_user_selection(&mut stdin.lock(), &mut io::stdout())?,
    };
    let user_id = selection.user_id();

    let score = pipeline.score_one(&model, user_id, settings.reference_movie);
    movie_io::print_score(io::stdout(), user_id, settings.reference_movie, score, &catalog)?;

    let pool = Pool::new(num_cpus::get());
    let recommendations =
        pipeline.top_k_parallel(&pool, &model, &catalog, user_id, settings.num_recommendations);
    pool.shutdown();

    movie_io::print_recommendations(
        io::stdout(),
        user_id,
        settings.num_recommendations,
        &recommendations,
        &catalog,
    )?;

    if let Some(output_path) = settings.output_path {
        info!("Writing recommendations to {}", output_path);
        movie_io::write_recommendations(user_id, &recommendations, &catalog, Some(output_path))?;
    }

    if interactive {
        println!();
        println!("Press enter to exit.");
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
    }

    Ok(())
}
