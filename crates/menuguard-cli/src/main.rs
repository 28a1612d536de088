//! MenuGuard command-line shell.
//!
//! Thin wrapper that loads configuration, sets up logging and dispatches to
//! the engine. Scanning logic lives in the `crates/` libraries.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing::info;

/// Initialize tracing subscriber for logging
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.lexicon.as_deref())?;

    init_tracing(&config.logging.filter);
    info!("Starting MenuGuard v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Scan {
            profile,
            text,
            file,
            quality,
            label,
        } => commands::scan(&config, &profile, text, file, quality, label),
        Commands::Menu {
            profile,
            file,
            quality,
        } => commands::menu(&config, &profile, &file, quality).await,
        Commands::Lexicon => commands::lexicon(&config),
        Commands::Config { save } => commands::config(&config, save),
    }
}
