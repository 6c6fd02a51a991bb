//! Tests for the Mercator projection and spherical helpers

use super::*;

/// Large enough that one pixel is well under 1e-4 degrees.
const FINE_SIZE: u32 = 1 << 23;

fn fine_projection() -> MercatorProjection {
    MercatorProjection::new(FINE_SIZE, FINE_SIZE)
}

#[test]
fn test_equator_prime_meridian_is_canvas_centre() {
    let projection = MercatorProjection::new(800, 800);
    let point = projection.project(0.0, 0.0);

    assert!(point.valid);
    assert!(!point.clamped);
    assert_eq!(point.x, 400);
    assert_eq!(point.y, 400);
}

#[test]
fn test_antimeridian_edges() {
    let projection = MercatorProjection::new(800, 800);
    assert_eq!(projection.project(0.0, -180.0).x, 0);
    assert_eq!(projection.project(0.0, 180.0).x, 800);
}

#[test]
fn test_roundtrip_within_mercator_band() {
    let projection = fine_projection();

    let mut lat = -85.0;
    while lat <= 85.0 {
        let mut lon = -180.0;
        // lon = 180 projects onto x == width, which is off-canvas by definition.
        while lon < 180.0 {
            let p = projection.project(lat, lon);
            assert!(p.valid);
            assert!(!p.clamped);

            let back = projection
                .unproject(p.x as f64, p.y as f64)
                .unwrap_or_else(|| panic!("({}, {}) projected off-canvas", lat, lon));

            assert!(
                (back.latitude - lat).abs() < 1e-4,
                "lat {} roundtripped to {}",
                lat,
                back.latitude
            );
            assert!(
                (back.longitude - lon).abs() < 1e-4,
                "lon {} roundtripped to {}",
                lon,
                back.longitude
            );
            lon += 17.3;
        }
        lat += 8.5;
    }
}

#[test]
fn test_roundtrip_known_cities() {
    let projection = fine_projection();
    let cities = [
        (51.4769, -0.0005),
        (40.7128, -74.0060),
        (-33.8651, 151.2099),
        (35.6762, 139.6503),
        (25.2048, 55.2708),
    ];

    for (lat, lon) in cities {
        let p = projection.project(lat, lon);
        let back = projection.unproject(p.x as f64, p.y as f64).unwrap();
        assert!((back.latitude - lat).abs() < 1e-4);
        assert!((back.longitude - lon).abs() < 1e-4);
    }
}

#[test]
fn test_pole_is_clamped_to_mercator_limit() {
    let projection = MercatorProjection::new(1024, 1024);

    let pole = projection.project(90.0, 0.0);
    let limit = projection.project(85.051129, 0.0);

    assert!(pole.valid);
    assert!(pole.clamped);
    assert_eq!(pole.y, limit.y);
    assert_eq!(pole.x, limit.x);
}

#[test]
fn test_south_pole_is_clamped() {
    let projection = MercatorProjection::new(1024, 1024);
    let pole = projection.project(-90.0, 10.0);
    assert!(pole.clamped);
    assert_eq!(pole.y, projection.project(MIN_LAT, 10.0).y);
}

#[test]
fn test_longitude_normalization_is_idempotent() {
    let projection = MercatorProjection::new(1000, 1000);

    let a = projection.project(0.0, 45.0);
    let b = projection.project(0.0, 405.0);
    let c = projection.project(0.0, -315.0);

    assert_eq!((a.x, a.y), (b.x, b.y));
    assert_eq!((a.x, a.y), (c.x, c.y));
    assert!(b.valid && c.valid);
}

#[test]
fn test_invalid_input_is_rejected_not_clamped() {
    let projection = MercatorProjection::new(1000, 1000);

    for (lat, lon) in [
        (f64::NAN, 0.0),
        (0.0, f64::INFINITY),
        (91.0, 0.0),
        (-90.5, 0.0),
    ] {
        let p = projection.project(lat, lon);
        assert!(!p.valid, "({}, {}) should be invalid", lat, lon);
        assert_eq!((p.x, p.y), (0, 0));
    }
}

#[test]
fn test_unproject_rejects_off_canvas_pixels() {
    let projection = MercatorProjection::new(640, 480);

    assert!(projection.unproject(-1.0, 10.0).is_none());
    assert!(projection.unproject(640.0, 10.0).is_none());
    assert!(projection.unproject(10.0, 480.0).is_none());
    assert!(projection.unproject(10.0, -0.5).is_none());
    assert!(projection.unproject(0.0, 0.0).is_some());
}

#[test]
fn test_update_dimensions_rescales() {
    let mut projection = MercatorProjection::new(360, 360);
    assert_eq!(projection.project(0.0, 90.0).x, 270);

    projection.update_dimensions(720, 720);
    assert_eq!(projection.width(), 720);
    assert_eq!(projection.project(0.0, 90.0).x, 540);
}

#[test]
fn test_normalize_longitude() {
    assert_eq!(normalize_longitude(45.0), 45.0);
    assert_eq!(normalize_longitude(180.0), 180.0);
    assert_eq!(normalize_longitude(-180.0), -180.0);
    assert_eq!(normalize_longitude(190.0), -170.0);
    assert_eq!(normalize_longitude(-190.0), 170.0);
    assert_eq!(normalize_longitude(540.0), 180.0);
    assert_eq!(normalize_longitude(-540.0), -180.0);
    assert_eq!(normalize_longitude(725.0), 5.0);
}

#[test]
fn test_is_valid_coordinate() {
    assert!(is_valid_coordinate(0.0, 0.0));
    assert!(is_valid_coordinate(90.0, -180.0));
    assert!(!is_valid_coordinate(90.1, 0.0));
    assert!(!is_valid_coordinate(0.0, 180.1));
    assert!(!is_valid_coordinate(f64::NAN, 0.0));
}

#[test]
fn test_round_to_precision() {
    assert_eq!(round_to_precision(1.23456789, 6), 1.234568);
    assert_eq!(round_to_precision(-0.125, 2), -0.13);
}

// ─────────────────────────────────────────────────────────────────────────
// Distance and bearing
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn test_distance_one_degree_at_equator() {
    // 2πR / 360 with R = 6378.137 km
    let d = calculate_distance(0.0, 0.0, 0.0, 1.0);
    assert!((d - 111.32).abs() < 0.01, "got {}", d);
}

#[test]
fn test_distance_is_symmetric_and_zero_for_same_point() {
    let ab = calculate_distance(51.5, -0.12, 40.71, -74.0);
    let ba = calculate_distance(40.71, -74.0, 51.5, -0.12);
    assert_eq!(ab, ba);
    assert!(ab > 5500.0 && ab < 5600.0, "London-NYC was {}", ab);
    assert_eq!(calculate_distance(10.0, 10.0, 10.0, 10.0), 0.0);
}

#[test]
fn test_bearing_cardinal_directions() {
    assert_eq!(calculate_bearing(0.0, 0.0, 1.0, 0.0), 0.0);
    assert_eq!(calculate_bearing(0.0, 0.0, 0.0, 1.0), 90.0);
    assert_eq!(calculate_bearing(0.0, 0.0, -1.0, 0.0), 180.0);
    assert_eq!(calculate_bearing(0.0, 0.0, 0.0, -1.0), 270.0);
}

#[test]
fn test_bearing_stays_below_360() {
    // Almost due north, slightly west: raw bearing ~359.99
    let bearing = calculate_bearing(0.0, 0.0, 10.0, -0.001);
    assert!((0.0..360.0).contains(&bearing), "got {}", bearing);
}

// ─────────────────────────────────────────────────────────────────────────
// Interpolation
// ─────────────────────────────────────────────────────────────────────────

#[test]
fn test_linear_midpoint_on_equator() {
    let mid = interpolate_position(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 10.0), 0.5);
    assert!(mid.latitude.abs() < 0.1);
    assert!((mid.longitude - 5.0).abs() < 0.1);
}

#[test]
fn test_linear_interpolation_crosses_antimeridian() {
    let mid = interpolate_position(GeoPoint::new(0.0, 170.0), GeoPoint::new(0.0, -170.0), 0.5);
    assert!(
        (mid.longitude.abs() - 180.0).abs() < 5.0,
        "expected near ±180, got {}",
        mid.longitude
    );

    let quarter =
        interpolate_position(GeoPoint::new(0.0, -170.0), GeoPoint::new(0.0, 170.0), 0.25);
    assert!((quarter.longitude - (-175.0)).abs() < 1e-6);
}

#[test]
fn test_great_circle_midpoint_on_equator() {
    let mid = interpolate_great_circle(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 10.0), 0.5);
    assert!(mid.latitude.abs() < 0.1);
    assert!((mid.longitude - 5.0).abs() < 0.1);
}

#[test]
fn test_great_circle_crosses_antimeridian() {
    let mid =
        interpolate_great_circle(GeoPoint::new(0.0, 170.0), GeoPoint::new(0.0, -170.0), 0.5);
    assert!(
        (mid.longitude.abs() - 180.0).abs() < 5.0,
        "expected near ±180, got {}",
        mid.longitude
    );
}

#[test]
fn test_great_circle_endpoints_and_poleward_bulge() {
    let start = GeoPoint::new(10.0, 20.0);
    let end = GeoPoint::new(10.0, 30.0);

    let at_start = interpolate_great_circle(start, end, 0.0);
    let at_end = interpolate_great_circle(start, end, 1.0);
    assert!((at_start.latitude - 10.0).abs() < 1e-9);
    assert!((at_start.longitude - 20.0).abs() < 1e-9);
    assert!((at_end.latitude - 10.0).abs() < 1e-9);
    assert!((at_end.longitude - 30.0).abs() < 1e-9);

    // The geodesic between two points on the same northern parallel bows north.
    let mid = interpolate_great_circle(start, end, 0.5);
    assert!(mid.latitude > 10.0);
    assert!((mid.longitude - 25.0).abs() < 1e-6);
}

#[test]
fn test_great_circle_rounds_to_six_decimals() {
    let p = interpolate_great_circle(GeoPoint::new(10.0, 20.0), GeoPoint::new(-5.0, 33.0), 0.37);
    assert_eq!(p.latitude, round_to_precision(p.latitude, 6));
    assert_eq!(p.longitude, round_to_precision(p.longitude, 6));

    // Endpoints come back exact rather than off by float noise.
    let end = interpolate_great_circle(GeoPoint::new(10.0, 20.0), GeoPoint::new(10.0, 30.0), 1.0);
    assert_eq!(end, GeoPoint::new(10.0, 30.0));
}

#[test]
fn test_great_circle_same_point_returns_start() {
    let p = GeoPoint::new(45.0, 45.0);
    assert_eq!(interpolate_great_circle(p, p, 0.3), p);
}

#[test]
fn test_great_circle_antipodal_falls_back_to_linear() {
    let mid = interpolate_great_circle(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0), 0.5);
    assert!(mid.latitude.is_finite() && mid.longitude.is_finite());
    assert!((mid.longitude - 90.0).abs() < 1e-6);
}

#[test]
fn test_scale_factor_and_distortion() {
    assert!((scale_factor(0.0) - 1.0).abs() < 1e-12);
    assert!((scale_factor(60.0) - 2.0).abs() < 1e-9);
    assert!((scale_factor(-60.0) - 2.0).abs() < 1e-9);
    assert!((area_distortion(60.0) - 4.0).abs() < 1e-9);
}

#[test]
fn test_projection_info() {
    let info = MercatorProjection::new(720, 720).info();
    assert_eq!(info.epsg, "EPSG:3857");
    assert_eq!(info.pixel.max_x, 719);
    assert_eq!(info.pixels_per_degree, 2.0);
    assert!((info.distortion.at_60_deg - 2.0).abs() < 1e-9);
}
