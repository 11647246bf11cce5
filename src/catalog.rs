use fnv::FnvHashMap;
use tracing::warn;

use crate::error::{CatalogError, Result};
use crate::io::{self, CsvTable};
use crate::types::MovieRow;

pub const UNKNOWN_TITLE: &str = "<unknown title>";

/// The movies we can recommend, in the order of the movies file. Duplicate ids are kept, so
/// that lookups can report them instead of silently picking one.
pub struct MovieCatalog {
    movies: Vec<MovieRow>,
    positions_by_id: FnvHashMap<i32, Vec<usize>>,
}

impl MovieCatalog {

    pub fn build(table: &CsvTable) -> Result<Self> {

        let mut movies = Vec::with_capacity(table.rows().len());

        for row_index in 0..table.rows().len() {
            let line = table.line_of(row_index);

            let id = io::parse_id(io::field(table, row_index, 0)?, line, 0)?;
            let title = io::field(table, row_index, 1)?.to_string();

            movies.push(MovieRow { id, title });
        }

        Ok(MovieCatalog::from(movies))
    }

    pub fn load(path: &str) -> Result<Self> {
        let table = CsvTable::load(path)?;
        MovieCatalog::build(&table)
    }

    pub fn get(&self, id: i32) -> std::result::Result<&MovieRow, CatalogError> {
        match self.positions_by_id.get(&id).map(|positions| positions.as_slice()) {
            Some(&[position]) => Ok(&self.movies[position]),
            Some(positions) if positions.len() > 1 =>
                Err(CatalogError::Ambiguous { id, count: positions.len() }),
            _ => Err(CatalogError::NotFound(id)),
        }
    }

    /// Title for display purposes, a failed lookup only costs us the title of one movie.
    pub fn title_or_placeholder(&self, id: i32) -> &str {
        match self.get(id) {
            Ok(movie) => &movie.title,
            Err(failure) => {
                warn!("Unable to look up the title of movie {}: {}", id, failure);
                UNKNOWN_TITLE
            }
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn movies(&self) -> &[MovieRow] {
        &self.movies
    }

    pub fn iter(&self) -> impl Iterator<Item=&MovieRow> {
        self.movies.iter()
    }
}

impl From<Vec<MovieRow>> for MovieCatalog {

    fn from(movies: Vec<MovieRow>) -> Self {

        let mut positions_by_id: FnvHashMap<i32, Vec<usize>> =
            FnvHashMap::with_capacity_and_hasher(movies.len(), Default::default());

        for (position, movie) in movies.iter().enumerate() {
            positions_by_id.entry(movie.id).or_insert_with(Vec::new).push(position);
        }

        MovieCatalog { movies, positions_by_id }
    }
}
