extern crate csv;
extern crate fnv;
extern crate num_cpus;
extern crate rand;
extern crate scoped_pool;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;

pub mod catalog;
pub mod error;
pub mod factorization;
pub mod input;
pub mod io;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod ranking;
pub mod stats;
pub mod types;
pub mod utils;


pub use crate::catalog::MovieCatalog;
pub use crate::error::{Error, Result};
pub use crate::factorization::{FactorModel, MatrixFactorization, TrainerOptions};
pub use crate::io::CsvTable;
pub use crate::model::{Scorer, Trainer};
pub use crate::pipeline::RecommendationPipeline;
pub use crate::ranking::ScoredMovie;
pub use crate::types::{MovieRow, RatingRecord};
