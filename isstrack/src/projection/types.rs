//! Projection type definitions

use serde::Serialize;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.051128779806592;
pub const MAX_LAT: f64 = 85.051128779806592;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// WGS84 equatorial radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

pub(crate) const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;
pub(crate) const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Result of projecting a geographic point onto the canvas.
///
/// `valid` is false only for unusable input (non-finite values or a latitude
/// outside [-90, 90]); in that case `x` and `y` are both zero. `clamped` is
/// true when the latitude was clipped to the Mercator band before projection,
/// so the point no longer inverts exactly to the source latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectedPoint {
    pub x: i64,
    pub y: i64,
    pub valid: bool,
    pub clamped: bool,
}

impl ProjectedPoint {
    pub(crate) const INVALID: Self = Self {
        x: 0,
        y: 0,
        valid: false,
        clamped: false,
    };
}

/// Geographic bounds covered by the projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Pixel bounds of the canvas (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBounds {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

/// Scale factor at a few reference latitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distortion {
    pub equator: f64,
    pub at_60_deg: f64,
    pub at_80_deg: f64,
}

/// Descriptive snapshot of a [`super::MercatorProjection`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionInfo {
    pub kind: &'static str,
    pub epsg: &'static str,
    pub datum: &'static str,
    pub width: u32,
    pub height: u32,
    pub geographic: GeoBounds,
    pub pixel: PixelBounds,
    pub pixels_per_degree: f64,
    pub pixels_per_radian: f64,
    pub distortion: Distortion,
}
