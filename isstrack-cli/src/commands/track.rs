//! Track command - continuous polling with smoothed output.
//!
//! Builds a fetcher and tracker from config, prints every accepted fix as it
//! arrives and runs until Ctrl-C or the optional `--duration-secs` elapses.
//! The final tracker status is printed as JSON on exit.

use std::time::Duration;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{format_position, CommonArgs};
use crate::error::CliError;
use crate::runner::CliRunner;
use isstrack::clock::SystemClock;
use isstrack::tracker::{PositionTracker, StatusEvent, TrackerDaemon};

/// Arguments for the track command.
#[derive(Debug, Args)]
pub struct TrackArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Poll interval in milliseconds (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Print each fix as a JSON line
    #[arg(long)]
    pub json: bool,
}

/// Run the track command.
pub async fn run(args: TrackArgs) -> Result<(), CliError> {
    let runner = CliRunner::from_args(&args.common)?;
    runner.log_startup("track");

    let mut config = runner.config().tracker.clone();
    if let Some(ms) = args.interval_ms {
        if ms == 0 {
            return Err(CliError::InvalidArgument(
                "--interval-ms must be greater than 0".to_string(),
            ));
        }
        config = config.with_update_interval(Duration::from_millis(ms));
    }

    let fetcher = runner.create_fetcher()?;
    let mut tracker = PositionTracker::new(fetcher, SystemClock, config);

    let json = args.json;
    tracker.on_position_update(move |position| {
        if json {
            match serde_json::to_string(position) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize position"),
            }
        } else {
            println!("{}", format_position(position));
        }
    });
    tracker.on_error(|error| eprintln!("! {} [{}]", error, error.code()));
    tracker.on_status_change(|event| {
        eprintln!("* {}", event);
        if event == StatusEvent::TrackingPaused {
            eprintln!("  Too many consecutive errors; restart to retry");
        }
    });

    let shutdown = CancellationToken::new();
    let (handle, join) = TrackerDaemon::spawn(tracker, shutdown.clone());
    handle.start();

    wait_for_exit(args.duration_secs.map(Duration::from_secs)).await;

    let status = handle.status().await;
    shutdown.cancel();
    let mut tracker = join
        .await
        .map_err(|e| CliError::Tracker(e.to_string()))?;
    tracker.destroy();

    if let Some(status) = status {
        println!("{}", serde_json::to_string_pretty(&status)?);
    }
    Ok(())
}

/// Resolve on Ctrl-C or once `duration` has elapsed.
async fn wait_for_exit(duration: Option<Duration>) {
    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Interrupted");
        }
        _ = deadline => {
            info!("Tracking duration elapsed");
        }
    }
}
