//! Lodestone CLI - ore searches from the command line.
//!
//! The search command prints the same JSON envelope the library's
//! response module produces, so scripts can parse stdout while log
//! output stays on stderr.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "lodestone",
    version,
    about = "Locate ore deposits around any coordinate, for any supported world seed"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for ore deposits around a coordinate
    Search(commands::search::SearchArgs),
    /// List the ore types the engine can report
    Ores(commands::ores::OresArgs),
    /// List the supported edition/version tags
    Versions(commands::versions::VersionsArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result: Result<(), CliError> = match cli.command {
        Command::Search(args) => commands::search::run(args).await,
        Command::Ores(args) => commands::ores::run(args),
        Command::Versions(args) => commands::versions::run(args),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Log to stderr, honoring `RUST_LOG` with an `info` fallback.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
