//! Synthetic orbit used when no live or cached data is available.
//!
//! The position is a closed-form function of wall-clock time, so repeated calls
//! during an outage trace a continuous path and the same instant always yields
//! the same fix.

use std::f64::consts::PI;

use crate::position::{Position, PositionSource};
use crate::projection::normalize_longitude;

/// Orbital period of the simulated track (90 minutes).
const ORBIT_PERIOD_MS: u64 = 90 * 60 * 1000;

/// Peak latitude of the track, close to the ISS inclination.
const INCLINATION_DEG: f64 = 51.5;

/// Typical ISS altitude in kilometers.
pub const DEMO_ALTITUDE_KM: f64 = 408.0;

/// Typical ISS ground velocity in km/h.
pub const DEMO_VELOCITY_KMH: f64 = 27_600.0;

/// Demo position for the given wall-clock time.
pub fn demo_position(now_ms: u64) -> Position {
    let phase = (now_ms % ORBIT_PERIOD_MS) as f64 / ORBIT_PERIOD_MS as f64 * 2.0 * PI;

    let latitude = INCLINATION_DEG * (phase * 0.95).sin() * (phase * 1.1).cos();
    // One degree of longitude per minute of wall-clock time.
    let minutes = now_ms as f64 / 60_000.0;
    let longitude = normalize_longitude(minutes % 360.0 - 180.0);

    let mut position = Position::new(
        latitude,
        longitude,
        (now_ms / 1000) as i64,
        PositionSource::Demo,
    )
    .with_altitude(DEMO_ALTITUDE_KM)
    .with_velocity(DEMO_VELOCITY_KMH);
    position.received_at = Some(now_ms);
    position
}
