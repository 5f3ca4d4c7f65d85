//! Cinema application library
//!
//! Holds the application modules and the bootstrap shared by the
//! `cinema-app` binary and the `cinema` CLI.

pub mod modules;

use anyhow::Context;
use cinema_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::*;

/// Build the module registry described by `settings`.
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings)?;
    Ok(registry)
}

/// Run the HTTP service until a shutdown signal arrives.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = cinema_http::start_server(&registry, &settings).await;

    registry
        .stop_all()
        .await
        .context("failed to stop modules cleanly")?;
    served
}
