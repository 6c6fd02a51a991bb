//! Core position types.
//!
//! - [`PositionSource`] - Where did this position come from?
//! - [`Position`] - A validated geographic fix plus optional vectors and provenance

use serde::{Deserialize, Serialize};

use crate::projection::{is_valid_coordinate, GeoPoint};

/// Provenance of a [`Position`].
///
/// The source never affects numeric validity; it tells consumers how much to
/// trust the fix (a `Demo` position is synthetic and should be flagged as such).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    /// Fetched live from the primary endpoint.
    Primary,
    /// Fetched live from the backup endpoint.
    Backup,
    /// Replayed from the fetcher's response cache.
    Cache,
    /// Synthesized by the closed-form demo orbit.
    Demo,
}

impl PositionSource {
    /// True for positions that came straight off the network.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Primary | Self::Backup)
    }
}

impl std::fmt::Display for PositionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Backup => write!(f, "backup"),
            Self::Cache => write!(f, "cache"),
            Self::Demo => write!(f, "demo"),
        }
    }
}

/// A geographic fix of the tracked object.
///
/// Not every upstream provides altitude, velocity or visibility, so those are
/// optional. `timestamp` is in seconds since the Unix epoch, taken from the
/// source when it supplies one and from fetch time otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,

    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,

    /// Altitude in kilometers.
    pub altitude: Option<f64>,

    /// Ground velocity in km/h.
    pub velocity: Option<f64>,

    /// Day/night visibility tag as reported by the upstream ("daylight", "eclipsed").
    pub visibility: Option<String>,

    /// Seconds since the Unix epoch.
    pub timestamp: i64,

    pub source: PositionSource,

    /// Wall-clock milliseconds at which the fetcher accepted this fix.
    pub received_at: Option<u64>,

    /// True when replayed from the response cache.
    #[serde(default)]
    pub cached: bool,

    /// Age of the cached entry at the time it was replayed.
    pub cache_age_ms: Option<u64>,
}

impl Position {
    /// Create a bare position with no vectors.
    pub fn new(latitude: f64, longitude: f64, timestamp: i64, source: PositionSource) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            velocity: None,
            visibility: None,
            timestamp,
            source,
            received_at: None,
            cached: false,
            cache_age_ms: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// True iff latitude/longitude are finite and inside their ranges.
    ///
    /// Invalid positions are never forwarded to consumers.
    #[inline]
    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.latitude, self.longitude)
    }

    /// True for synthetic positions that must be visibly flagged.
    #[inline]
    pub fn is_demo(&self) -> bool {
        self.source == PositionSource::Demo
    }

    /// The latitude/longitude pair.
    #[inline]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
