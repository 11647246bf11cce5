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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use crate::catalog::MovieCatalog;
use crate::error::{LoadError, ParseError, Result};
use crate::ranking::ScoredMovie;
use crate::types::RatingRecord;

/// Location of the sample ratings, relative to the crate root.
pub const DEFAULT_RATINGS_PATH: &str = "data/recommendation-ratings-test.csv";
/// Location of the sample movies, relative to the crate root.
pub const DEFAULT_MOVIES_PATH: &str = "data/recommendation-movies.csv";

/// Comma separated values with a header line. We do not support quoting, a comma always ends
/// a field, and rows may have a different number of fields than the header.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    line_numbers: Vec<u64>,
}

impl CsvTable {

    pub fn load(path: &str) -> std::result::Result<Self, LoadError> {
        let file = File::open(Path::new(path))
            .map_err(|source| LoadError::Io { path: path.to_string(), source })?;

        read_table(file, path)
    }

    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, LoadError> {
        read_table(reader, "<input>")
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Line in the input file where the row at `row_index` was found.
    pub fn line_of(&self, row_index: usize) -> u64 {
        self.line_numbers[row_index]
    }
}

/// Reader for our CSV dialect.
pub fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .quoting(false)
        .flexible(true)
        .from_reader(reader)
}

fn read_table<R: Read>(reader: R, path: &str) -> std::result::Result<CsvTable, LoadError> {

    let mut reader = csv_reader(reader);
    let mut records = reader.records();

    let columns: Vec<String> = match records.next() {
        Some(header) => header?.iter().map(String::from).collect(),
        None => return Err(LoadError::Empty { path: path.to_string() }),
    };

    let mut rows = Vec::new();
    let mut line_numbers = Vec::new();

    for record in records {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);

        rows.push(record.iter().map(String::from).collect());
        line_numbers.push(line);
    }

    Ok(CsvTable { columns, rows, line_numbers })
}

/// Returns the field at `column` of a row, or fails if the row is too short.
pub fn field<'a>(
    table: &'a CsvTable,
    row_index: usize,
    column: usize,
) -> std::result::Result<&'a str, LoadError> {

    table.rows()[row_index]
        .get(column)
        .map(|value| value.as_str())
        .ok_or_else(|| LoadError::MissingField { line: table.line_of(row_index), column })
}

/// Identifiers may be written as integers or as integral floats such as `10.0`.
pub fn parse_id(value: &str, line: u64, column: usize) -> std::result::Result<i32, ParseError> {
    let trimmed = value.trim();

    if let Ok(id) = trimmed.parse::<i32>() {
        return Ok(id);
    }

    match trimmed.parse::<f64>() {
        Ok(id) if id.fract() == 0.0 && id >= i32::MIN as f64 && id <= i32::MAX as f64 =>
            Ok(id as i32),
        _ => Err(ParseError { line, column, value: value.to_string() }),
    }
}

/// Ratings must be finite, `NaN` and `inf` are rejected here rather than during training.
pub fn parse_label(value: &str, line: u64, column: usize) -> std::result::Result<f32, ParseError> {
    match value.trim().parse::<f32>() {
        Ok(label) if label.is_finite() => Ok(label),
        _ => Err(ParseError { line, column, value: value.to_string() }),
    }
}

/// Converts the rows of a ratings table into records. Columns are used by position: user id,
/// movie id and rating, any further columns (like timestamps) are ignored.
pub fn ratings_from_table(table: &CsvTable) -> Result<Vec<RatingRecord>> {

    let mut ratings = Vec::with_capacity(table.rows().len());

    for row_index in 0..table.rows().len() {
        let line = table.line_of(row_index);

        let user_id = parse_id(field(table, row_index, 0)?, line, 0)?;
        let movie_id = parse_id(field(table, row_index, 1)?, line, 1)?;
        let label = parse_label(field(table, row_index, 2)?, line, 2)?;

        ratings.push(RatingRecord::new(user_id, movie_id, label));
    }

    Ok(ratings)
}

pub fn read_ratings(path: &str) -> Result<Vec<RatingRecord>> {
    let table = CsvTable::load(path)?;
    ratings_from_table(&table)
}

/// Struct used for JSON serialization of recommendations. Field names will be used in JSON.
#[derive(Serialize)]
struct Recommendation<'a> {
    user_id: i32,
    movie_id: i32,
    title: &'a str,
    score: f32,
}

/// Output the recommendations for a user in JSON format, one object per line. If an
/// `output_path` is supplied, we write to a file at the specified path, otherwise, we output
/// to stdout.
pub fn write_recommendations(
    user_id: i32,
    recommendations: &[ScoredMovie],
    catalog: &MovieCatalog,
    output_path: Option<String>,
) -> io::Result<()> {

    let out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    write_recommendations_to(out, user_id, recommendations, catalog)
}

pub fn write_recommendations_to<W: Write>(
    mut out: W,
    user_id: i32,
    recommendations: &[ScoredMovie],
    catalog: &MovieCatalog,
) -> io::Result<()> {

    for scored_movie in recommendations {

        let recommendation = Recommendation {
            user_id,
            movie_id: scored_movie.movie_id,
            title: catalog.title_or_placeholder(scored_movie.movie_id),
            score: scored_movie.score,
        };

        let as_json = serde_json::to_string(&recommendation)?;

        writeln!(out, "{}", as_json)?;
    }

    out.flush()
}

/// Console report for the score of a single user/movie pair.
pub fn print_score<W: Write>(
    mut out: W,
    user_id: i32,
    movie_id: i32,
    score: f32,
    catalog: &MovieCatalog,
) -> io::Result<()> {

    writeln!(
        out,
        "Calculating the score for user {} liking the movie '{}'...",
        user_id,
        catalog.title_or_placeholder(movie_id),
    )?;
    writeln!(out, "  Score: {}", score)?;
    writeln!(out)
}

/// Console report of the recommendations for a user, one tab separated line per movie.
pub fn print_recommendations<W: Write>(
    mut out: W,
    user_id: i32,
    num_requested: usize,
    recommendations: &[ScoredMovie],
    catalog: &MovieCatalog,
) -> io::Result<()> {

    writeln!(out, "Calculating the top {} movies for user {}...", num_requested, user_id)?;

    for scored_movie in recommendations {
        writeln!(
            out,
            "  Score:{}\tMovie: {}",
            scored_movie.score,
            catalog.title_or_placeholder(scored_movie.movie_id),
        )?;
    }

    out.flush()
}
