use std::io;

use thiserror::Error as ThisError;

/// Failures while reading an input file into a table or records.
#[derive(ThisError, Debug)]
pub enum LoadError {
    #[error("Unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input file {path} is empty")]
    Empty { path: String },

    #[error("Line {line} has no field in column {column}")]
    MissingField { line: u64, column: usize },
}

/// A field that should hold a number but doesn't.
#[derive(ThisError, Debug, PartialEq)]
#[error("Line {line}, column {column}: '{value}' is not a valid number")]
pub struct ParseError {
    pub line: u64,
    pub column: usize,
    pub value: String,
}

#[derive(ThisError, Debug, PartialEq)]
pub enum CatalogError {
    #[error("No movie with id {0}")]
    NotFound(i32),

    #[error("Movie id {id} is shared by {count} movies")]
    Ambiguous { id: i32, count: usize },
}

#[derive(ThisError, Debug, PartialEq)]
pub enum TrainingError {
    #[error("Cannot train on an empty set of ratings")]
    NoRatings,

    #[error("Rating #{index} has a non-finite label {label}")]
    InvalidLabel { index: usize, label: f32 },

    #[error("Invalid trainer options: {0}")]
    InvalidOptions(String),

    #[error("Training diverged in iteration {iteration}")]
    Diverged { iteration: usize },
}

#[derive(ThisError, Debug, PartialEq)]
pub enum EvaluationError {
    #[error("The model produced no finite prediction for the given ratings")]
    NoPredictions,
}

#[derive(ThisError, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Unable to write output: {0}")]
    Output(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
