//! Mercator projection module
//!
//! Converts between geographic coordinates (latitude/longitude) and pixel
//! coordinates on a Web Mercator canvas, plus the spherical helpers used to
//! animate a moving point (distance, bearing, interpolation).
//!
//! The canvas-dependent conversions live on [`MercatorProjection`]; the
//! geometry that does not care about canvas size is exposed as free functions.

mod geodesy;
mod types;

#[cfg(test)]
mod tests;

pub use geodesy::{
    area_distortion, calculate_bearing, calculate_distance, interpolate_great_circle,
    interpolate_position, scale_factor,
};
pub use types::{
    Distortion, GeoBounds, GeoPoint, PixelBounds, ProjectedPoint, ProjectionInfo, EARTH_RADIUS_M,
    MAX_LAT, MAX_LON, MIN_LAT, MIN_LON,
};

use std::f64::consts::PI;

use types::{DEG_TO_RAD, RAD_TO_DEG};

/// Web Mercator (EPSG:3857) projection onto a `width × height` pixel canvas.
///
/// The full longitude range spans the canvas width; the vertical axis is
/// centred on the equator, so a square canvas shows the whole Mercator band.
#[derive(Debug, Clone, PartialEq)]
pub struct MercatorProjection {
    width: u32,
    height: u32,
    height_half: f64,
    pixels_per_degree: f64,
    pixels_per_radian: f64,
}

impl MercatorProjection {
    /// Create a projection for a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let mut projection = Self {
            width,
            height,
            height_half: 0.0,
            pixels_per_degree: 0.0,
            pixels_per_radian: 0.0,
        };
        projection.update_dimensions(width, height);
        projection
    }

    /// Resize the canvas and recompute the cached scale constants.
    pub fn update_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.height_half = height as f64 / 2.0;
        self.pixels_per_degree = width as f64 / 360.0;
        self.pixels_per_radian = width as f64 / (2.0 * PI);

        tracing::debug!(width, height, "Mercator projection dimensions updated");
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Project a geographic coordinate to pixel space.
    ///
    /// Latitude is clamped to the Mercator band (reported via `clamped`) and
    /// longitude is normalized into [-180, 180] first. Both pixel coordinates
    /// are rounded to the nearest integer.
    pub fn project(&self, latitude: f64, longitude: f64) -> ProjectedPoint {
        if !latitude.is_finite() || !longitude.is_finite() || !(-90.0..=90.0).contains(&latitude)
        {
            tracing::warn!(latitude, longitude, "Cannot project invalid coordinates");
            return ProjectedPoint::INVALID;
        }

        let clamped_lat = latitude.clamp(MIN_LAT, MAX_LAT);
        let lon = normalize_longitude(longitude);

        let x = (lon + 180.0) * self.pixels_per_degree;

        let lat_rad = clamped_lat * DEG_TO_RAD;
        let mercator_y = (PI / 4.0 + lat_rad / 2.0).tan().ln();
        let y = self.height_half - mercator_y * self.pixels_per_radian;

        ProjectedPoint {
            x: x.round() as i64,
            y: y.round() as i64,
            valid: true,
            clamped: clamped_lat != latitude,
        }
    }

    /// Inverse of [`project`](Self::project).
    ///
    /// Returns `None` for pixels outside `[0, width) × [0, height)`.
    /// Outputs are rounded to 6 decimal places.
    pub fn unproject(&self, x: f64, y: f64) -> Option<GeoPoint> {
        if !self.is_within_bounds(x, y) {
            tracing::warn!(x, y, "Pixel coordinates out of bounds");
            return None;
        }

        let longitude = x / self.pixels_per_degree - 180.0;

        let mercator_y = (self.height_half - y) / self.pixels_per_radian;
        let lat_rad = 2.0 * (mercator_y.exp().atan() - PI / 4.0);
        let latitude = lat_rad * RAD_TO_DEG;

        Some(GeoPoint::new(
            round_to_precision(latitude, 6),
            round_to_precision(normalize_longitude(longitude), 6),
        ))
    }

    /// True if the pixel lies on the canvas.
    pub fn is_within_bounds(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < self.width as f64 && y >= 0.0 && y < self.height as f64
    }

    /// Describe the projection and its scale/distortion characteristics.
    pub fn info(&self) -> ProjectionInfo {
        ProjectionInfo {
            kind: "Mercator (Web Mercator)",
            epsg: "EPSG:3857",
            datum: "WGS84",
            width: self.width,
            height: self.height,
            geographic: GeoBounds {
                lat_min: MIN_LAT,
                lat_max: MAX_LAT,
                lon_min: MIN_LON,
                lon_max: MAX_LON,
            },
            pixel: PixelBounds {
                min_x: 0,
                max_x: self.width.saturating_sub(1),
                min_y: 0,
                max_y: self.height.saturating_sub(1),
            },
            pixels_per_degree: self.pixels_per_degree,
            pixels_per_radian: self.pixels_per_radian,
            distortion: Distortion {
                equator: 1.0,
                at_60_deg: scale_factor(60.0),
                at_80_deg: scale_factor(80.0),
            },
        }
    }
}

/// True if both values are finite and inside the geographic ranges.
#[inline]
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (MIN_LON..=MAX_LON).contains(&longitude)
}

/// Wrap a longitude into [-180, 180].
///
/// Values already in range are returned untouched, so both -180 and 180 survive.
#[inline]
pub fn normalize_longitude(longitude: f64) -> f64 {
    if (MIN_LON..=MAX_LON).contains(&longitude) || !longitude.is_finite() {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // Keep the sign convention of repeated ±360 steps for exact multiples.
    if wrapped == MIN_LON && longitude > 0.0 {
        MAX_LON
    } else {
        wrapped
    }
}

/// Round to `precision` decimal places.
#[inline]
pub fn round_to_precision(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}
