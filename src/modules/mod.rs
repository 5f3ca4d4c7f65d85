pub mod movies;

use std::sync::Arc;

use anyhow::Context;
use cinema_kernel::{settings::Settings, ModuleRegistry};

use movies::store::MovieStore;

/// Seed the catalogue and register every application module with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let seed = movies::seed::load(&settings.catalog).context("failed to seed movie catalogue")?;
    tracing::info!(movies = seed.len(), "movie catalogue seeded");

    let store = Arc::new(MovieStore::new(seed));
    registry.register(movies::create_module(store));
    Ok(())
}
