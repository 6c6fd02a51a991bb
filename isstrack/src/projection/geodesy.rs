//! Spherical geometry helpers: distance, bearing and interpolation.

use super::types::{GeoPoint, DEG_TO_RAD, EARTH_RADIUS_M, RAD_TO_DEG};
use super::{normalize_longitude, round_to_precision};

/// Great-circle (haversine) distance between two points, in kilometers.
///
/// Rounded to 2 decimal places.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1) * DEG_TO_RAD;
    let d_lon = (lon2 - lon1) * DEG_TO_RAD;

    let a = (d_lat / 2.0).sin().powi(2)
        + (lat1 * DEG_TO_RAD).cos() * (lat2 * DEG_TO_RAD).cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to_precision(EARTH_RADIUS_M * c / 1000.0, 2)
}

/// Initial bearing from the first point to the second, in degrees [0, 360).
///
/// Rounded to 1 decimal place.
pub fn calculate_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lon = (lon2 - lon1) * DEG_TO_RAD;
    let lat1 = lat1 * DEG_TO_RAD;
    let lat2 = lat2 * DEG_TO_RAD;

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    let bearing = round_to_precision((y.atan2(x) * RAD_TO_DEG).rem_euclid(360.0), 1);
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Linear interpolation that takes the short way across the antimeridian.
///
/// Latitude is interpolated linearly. If the longitudes differ by more than
/// 180° the shorter arc is used and the result is wrapped back into
/// [-180, 180]. Outputs are rounded to 6 decimal places.
pub fn interpolate_position(start: GeoPoint, end: GeoPoint, t: f64) -> GeoPoint {
    let mut start_lon = start.longitude;
    let mut end_lon = end.longitude;

    let diff = end_lon - start_lon;
    if diff.abs() > 180.0 {
        if diff > 0.0 {
            start_lon += 360.0;
        } else {
            end_lon += 360.0;
        }
    }

    let lat = start.latitude + (end.latitude - start.latitude) * t;
    let lon = normalize_longitude(start_lon + (end_lon - start_lon) * t);

    GeoPoint::new(round_to_precision(lat, 6), round_to_precision(lon, 6))
}

/// Spherical linear interpolation along the great circle through two points.
///
/// Coincident endpoints return the start; antipodal endpoints (where the
/// great circle is not unique) fall back to [`interpolate_position`].
/// Results are rounded to 6 decimal places.
pub fn interpolate_great_circle(start: GeoPoint, end: GeoPoint, t: f64) -> GeoPoint {
    let lat1 = start.latitude * DEG_TO_RAD;
    let lon1 = start.longitude * DEG_TO_RAD;
    let lat2 = end.latitude * DEG_TO_RAD;
    let lon2 = end.longitude * DEG_TO_RAD;

    let cos_d = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos();
    let d = cos_d.clamp(-1.0, 1.0).acos();

    if d == 0.0 {
        return start;
    }
    let sin_d = d.sin();
    if sin_d.abs() < 1e-12 {
        return interpolate_position(start, end, t);
    }

    let a = ((1.0 - t) * d).sin() / sin_d;
    let b = (t * d).sin() / sin_d;

    let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
    let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    let lat = z.atan2((x * x + y * y).sqrt()) * RAD_TO_DEG;
    let lon = y.atan2(x) * RAD_TO_DEG;

    GeoPoint::new(
        round_to_precision(lat, 6),
        round_to_precision(normalize_longitude(lon), 6),
    )
}

/// Linear scale factor of the Mercator projection at a latitude.
///
/// 1.0 at the equator, growing towards the poles. Diagnostic only.
#[inline]
pub fn scale_factor(latitude: f64) -> f64 {
    1.0 / (latitude.abs() * DEG_TO_RAD).cos()
}

/// Areal distortion (square of the scale factor) at a latitude.
#[inline]
pub fn area_distortion(latitude: f64) -> f64 {
    scale_factor(latitude).powi(2)
}
