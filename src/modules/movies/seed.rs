//! Startup seed for the movie collection.
//!
//! Seed entries go through the same full validation as `POST /movies`; the
//! only extra field allowed is the string `id`.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use cinema_kernel::settings::CatalogSettings;
use serde_json::Value;
use thiserror::Error;

use super::models::Movie;
use super::validation::{validate_movie, ValidationErrors};

const EMBEDDED_SEED: &str = include_str!("../../../data/movies.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed is not a JSON array of movies: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("seed entry {index} has no string 'id'")]
    MissingId { index: usize },

    #[error("seed entry {index} ('{id}') is invalid: {source}")]
    Invalid {
        index: usize,
        id: String,
        #[source]
        source: ValidationErrors,
    },

    #[error("seed id '{id}' appears more than once")]
    DuplicateId { id: String },
}

/// Load the configured seed, falling back to the embedded one.
pub fn load(settings: &CatalogSettings) -> anyhow::Result<Vec<Movie>> {
    match &settings.seed_path {
        Some(path) => load_file(path),
        None => parse(EMBEDDED_SEED).context("embedded movie seed is invalid"),
    }
}

fn load_file(path: &Path) -> anyhow::Result<Vec<Movie>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read movie seed {}", path.display()))?;
    parse(&source).with_context(|| format!("movie seed {} is invalid", path.display()))
}

/// Parse and validate a JSON array of movies with ids.
pub fn parse(source: &str) -> Result<Vec<Movie>, SeedError> {
    let entries: Vec<Value> = serde_json::from_str(source)?;
    let mut seen = HashSet::with_capacity(entries.len());
    let mut movies = Vec::with_capacity(entries.len());

    for (index, mut entry) in entries.into_iter().enumerate() {
        let id = match entry.as_object_mut().and_then(|fields| fields.remove("id")) {
            Some(Value::String(id)) => id,
            _ => return Err(SeedError::MissingId { index }),
        };

        let data = validate_movie(&entry).map_err(|source| SeedError::Invalid {
            index,
            id: id.clone(),
            source,
        })?;

        if !seen.insert(id.clone()) {
            return Err(SeedError::DuplicateId { id });
        }
        movies.push(Movie::new(id, data));
    }

    Ok(movies)
}
