//! Projection commands - Mercator lookups without touching the network.

use clap::{Args, Subcommand};

use crate::error::CliError;
use isstrack::projection::{
    calculate_bearing, calculate_distance, is_valid_coordinate, scale_factor, MercatorProjection,
};

/// Arguments for the project command.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Canvas width in pixels
    #[arg(long, default_value = "1024")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value = "1024")]
    pub height: u32,

    #[command(subcommand)]
    pub command: ProjectCommands,
}

/// Projection subcommands.
#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// Convert latitude/longitude to canvas pixels
    ToPixel {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Convert canvas pixels to latitude/longitude
    ToGeo {
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },

    /// Great-circle distance and initial bearing between two points
    Distance {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lon: f64,
    },

    /// Print projection parameters and distortion as JSON
    Info,
}

/// Run the project command.
pub fn run(args: ProjectArgs) -> Result<(), CliError> {
    if args.width == 0 || args.height == 0 {
        return Err(CliError::InvalidArgument(
            "canvas width and height must be greater than 0".to_string(),
        ));
    }
    let projection = MercatorProjection::new(args.width, args.height);

    match args.command {
        ProjectCommands::ToPixel { lat, lon } => {
            let point = projection.project(lat, lon);
            if !point.valid {
                return Err(CliError::InvalidArgument(format!(
                    "cannot project ({}, {})",
                    lat, lon
                )));
            }
            println!("x {}  y {}", point.x, point.y);
            if point.clamped {
                println!("(latitude clamped to the Mercator band)");
            }
            if let Some(back) = projection.unproject(point.x as f64, point.y as f64) {
                println!("round trip lat {}  lon {}", back.latitude, back.longitude);
            }
            println!("scale factor {:.3}", scale_factor(lat));
        }
        ProjectCommands::ToGeo { x, y } => {
            let point = projection.unproject(x, y).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "({}, {}) is outside the {}x{} canvas",
                    x, y, args.width, args.height
                ))
            })?;
            println!("lat {}  lon {}", point.latitude, point.longitude);
        }
        ProjectCommands::Distance {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
        } => {
            for (lat, lon) in [(from_lat, from_lon), (to_lat, to_lon)] {
                if !is_valid_coordinate(lat, lon) {
                    return Err(CliError::InvalidArgument(format!(
                        "invalid coordinate ({}, {})",
                        lat, lon
                    )));
                }
            }
            println!(
                "{} km  bearing {}°",
                calculate_distance(from_lat, from_lon, to_lat, to_lon),
                calculate_bearing(from_lat, from_lon, to_lat, to_lon)
            );
        }
        ProjectCommands::Info => {
            println!("{}", serde_json::to_string_pretty(&projection.info())?);
        }
    }

    Ok(())
}
