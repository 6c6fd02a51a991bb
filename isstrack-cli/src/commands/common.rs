//! Shared argument definitions and formatting helpers for CLI commands.

use std::path::PathBuf;

use chrono::DateTime;
use clap::Args;

use isstrack::position::Position;

/// Options accepted by every networked command.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Config file to load instead of ~/.isstrack/config.ini
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write log output to stdout
    #[arg(long, short)]
    pub verbose: bool,

    /// Enable debug-level logging (overridden by RUST_LOG)
    #[arg(long)]
    pub debug: bool,
}

/// One-line human-readable summary of a position.
pub fn format_position(position: &Position) -> String {
    let time = DateTime::from_timestamp(position.timestamp, 0)
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| position.timestamp.to_string());

    let mut line = format!(
        "{}  lat {:>9.4}  lon {:>9.4}",
        time, position.latitude, position.longitude
    );
    if let Some(altitude) = position.altitude {
        line.push_str(&format!("  alt {:.1} km", altitude));
    }
    if let Some(velocity) = position.velocity {
        line.push_str(&format!("  vel {:.0} km/h", velocity));
    }
    line.push_str(&format!("  [{}]", source_label(position)));
    line
}

/// Provenance tag; cached and demo fixes are flagged so they are never
/// mistaken for live data.
pub fn source_label(position: &Position) -> String {
    match position.cache_age_ms {
        Some(age) if position.cached => format!("{} (cached {}s ago)", position.source, age / 1000),
        _ if position.is_demo() => format!("{} (simulated)", position.source),
        _ => position.source.to_string(),
    }
}
