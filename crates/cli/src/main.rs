use anyhow::Context;
use clap::{Parser, Subcommand};
use cinema_kernel::settings::Settings;

/// Command-line entrypoint for the cinema service
#[derive(Debug, Parser)]
#[command(name = "cinema", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the movie catalogue over HTTP (default)
    Serve {
        /// Interface to bind, overriding `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding `server.port` and `PORT`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load and validate the configured movie seed, then exit
    CheckSeed,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load cinema settings")?;
    cinema_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            tracing::info!(
                env = ?settings.environment,
                address = %settings.server.bind_address(),
                "cinema CLI serving"
            );

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(cinema_app::serve(settings))
        }
        Command::CheckSeed => {
            let movies = cinema_app::movies::seed::load(&settings.catalog)?;
            let source = settings
                .catalog
                .seed_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "embedded seed".to_string());
            println!("seed ok: {} movies from {}", movies.len(), source);
            Ok(())
        }
    }
}
