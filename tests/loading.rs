extern crate movie_recommender;
extern crate tempfile;

use std::io::Write;

use tempfile::NamedTempFile;

use movie_recommender::catalog::MovieCatalog;
use movie_recommender::error::{CatalogError, Error, LoadError};
use movie_recommender::io::{self, CsvTable};
use movie_recommender::{MatrixFactorization, RecommendationPipeline, TrainerOptions};

fn file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_str().unwrap().to_string()
}

#[test]
fn table_from_file() {
    let file = file_with("a,b,c\n1,2,3\n");
    let table = CsvTable::load(&path_of(&file)).unwrap();

    assert_eq!(table.columns(), &["a", "b", "c"]);
    assert_eq!(table.rows(), &[vec!["1", "2", "3"]]);
}

#[test]
fn missing_file() {
    match CsvTable::load("/this/path/does/not/exist.csv") {
        Err(LoadError::Io { path, .. }) => assert_eq!(path, "/this/path/does/not/exist.csv"),
        other => panic!("Expected an io error, got {:?}", other),
    }
}

#[test]
fn empty_file() {
    let file = file_with("");

    match io::read_ratings(&path_of(&file)) {
        Err(Error::Load(LoadError::Empty { .. })) => {},
        other => panic!("Expected an empty file error, got {:?}", other),
    }
}

#[test]
fn catalog_from_file() {
    let file = file_with("id,title\n1,GoldenEye\n2,Top Gun\n1,GoldenEye (Director's Cut)\n");
    let catalog = MovieCatalog::load(&path_of(&file)).unwrap();

    assert_eq!(catalog.get(2).unwrap().title, "Top Gun");
    assert_eq!(catalog.get(999), Err(CatalogError::NotFound(999)));
    assert_eq!(catalog.get(1), Err(CatalogError::Ambiguous { id: 1, count: 2 }));
}

#[test]
fn end_to_end() {
    let mut ratings_csv = String::from("userId,movieId,Label\n");
    for user in 1..6 {
        for (index, movie) in [10, 20, 30].iter().enumerate() {
            let label = 1 + (user + index as i32) % 5;
            ratings_csv.push_str(&format!("{},{},{}\n", user, movie, label));
        }
    }

    let ratings_file = file_with(&ratings_csv);
    let movies_file = file_with("id,title\n10,GoldenEye\n20,Top Gun\n30,Heat\n");

    let ratings = io::read_ratings(&path_of(&ratings_file)).unwrap();
    let catalog = MovieCatalog::load(&path_of(&movies_file)).unwrap();

    assert_eq!(ratings.len(), 15);

    let pipeline = RecommendationPipeline::new(MatrixFactorization::new(TrainerOptions::default()));
    let model = pipeline.train(&ratings).unwrap();

    assert!(pipeline.score_one(&model, 1, 10).is_finite());

    let recommendations = pipeline.top_k(&model, &catalog, 1, 5);

    assert!(recommendations.len() <= 3);
    for scored_movie in recommendations.iter() {
        assert!(catalog.get(scored_movie.movie_id).is_ok());
        assert!(scored_movie.score.is_finite());
    }
}

#[test]
fn recommendations_written_as_json_lines() {
    let movies_file = file_with("id,title\n10,GoldenEye\n20,Top Gun\n");
    let catalog = MovieCatalog::load(&path_of(&movies_file)).unwrap();

    let model = |_user_id: i32, movie_id: i32| -> f32 { movie_id as f32 / 10.0 };
    let recommendations = movie_recommender::ranking::top_k(&model, &catalog, 4, 5);

    let output = NamedTempFile::new().unwrap();
    io::write_recommendations(4, &recommendations, &catalog, Some(path_of(&output))).unwrap();

    let written = std::fs::read_to_string(output.path()).unwrap();
    let lines: Vec<&str> = written.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"title\":\"Top Gun\""));
    assert!(lines[1].contains("\"title\":\"GoldenEye\""));
}

#[test]
fn bundled_sample_data_is_the_default() {
    let root = env!("CARGO_MANIFEST_DIR");
    let ratings_path = format!("{}/{}", root, io::DEFAULT_RATINGS_PATH);
    let movies_path = format!("{}/{}", root, io::DEFAULT_MOVIES_PATH);

    let ratings = io::read_ratings(&ratings_path).unwrap();
    let catalog = MovieCatalog::load(&movies_path).unwrap();

    assert!(!ratings.is_empty());
    assert_eq!(catalog.get(10).unwrap().title, "GoldenEye (1995)");
}
