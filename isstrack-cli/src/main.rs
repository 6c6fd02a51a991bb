//! isstrack CLI - Command-line interface
//!
//! This binary provides a command-line interface to the isstrack library:
//! live tracking, one-shot fetches and Mercator projection lookups.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::{fetch, project, track};

#[derive(Parser)]
#[command(name = "isstrack")]
#[command(version, about = "Track the International Space Station", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the ISS position and print smoothed updates until interrupted
    Track(track::TrackArgs),

    /// Fetch the ISS position once and print it with fetcher statistics
    Fetch(fetch::FetchArgs),

    /// Convert between coordinates and pixels on a Mercator canvas
    Project(project::ProjectArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Track(args) => track::run(args).await,
        Commands::Fetch(args) => fetch::run(args).await,
        Commands::Project(args) => project::run(args),
    };

    if let Err(e) = result {
        e.exit();
    }
}
