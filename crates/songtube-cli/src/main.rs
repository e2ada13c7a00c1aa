mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "songtube=info,songtube_core=info",
        1 => "songtube=debug,songtube_core=debug",
        2 => "songtube=trace,songtube_core=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Resolve { query, search } => {
            commands::resolve::run(&query, &search, config_path).await
        }
        Commands::Download { url, download } => {
            commands::download::run(&url, &download, config_path).await
        }
        Commands::Get {
            query,
            search,
            download,
        } => commands::get::run(&query, &search, &download, config_path).await,
        Commands::Batch {
            input,
            parallel,
            search,
            download,
        } => commands::batch::run(&input, parallel, &search, &download, config_path).await,
        Commands::Doctor => commands::doctor::run(config_path).await,
        Commands::Config => commands::config::run(config_path).await,
    }
}
