//! Fetch command - one position lookup through the full fallback chain.

use clap::Args;
use serde_json::json;

use super::common::{format_position, CommonArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the fetch command.
///
/// The summary line goes to stderr; stdout carries only the JSON document.
pub async fn run(args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::from_args(&args.common)?;
    runner.log_startup("fetch");

    let mut fetcher = runner.create_fetcher()?;
    let position = fetcher.fetch_position().await;
    let stats = fetcher.stats();

    eprintln!("{}", format_position(&position));
    if stats.circuit_open() {
        eprintln!("Upstream: {}", stats.circuit_state.display_status());
    }

    let output = json!({ "position": position, "stats": stats });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
