//! Response normalization.
//!
//! Two upstream shapes are recognized and mapped onto one [`Position`]:
//!
//! ```text
//! flat:   {"latitude": 51.2, "longitude": -3.4, "altitude": 420.1,
//!          "velocity": 27580.4, "visibility": "daylight", "timestamp": 1700000000}
//! legacy: {"message": "success", "timestamp": 1700000000,
//!          "iss_position": {"latitude": "51.2", "longitude": "-3.4"}}
//! ```
//!
//! The legacy wrapper reports coordinates as strings; both strings and numbers
//! are accepted there. The flat shape requires JSON numbers.

use serde_json::{Map, Value};

use super::error::FetchError;
use crate::position::{Position, PositionSource};
use crate::projection::is_valid_coordinate;

/// Parse and validate a response body.
///
/// `fallback_timestamp` (seconds) is used when the body carries none.
pub fn parse_position(
    body: &[u8],
    source: PositionSource,
    fallback_timestamp: i64,
) -> Result<Position, FetchError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidFormat(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| FetchError::InvalidFormat("expected a JSON object".to_string()))?;

    let mut position = if object.contains_key("iss_position") {
        parse_legacy(object, source, fallback_timestamp)?
    } else {
        parse_flat(object, source, fallback_timestamp)?
    };

    if !is_valid_coordinate(position.latitude, position.longitude) {
        return Err(FetchError::InvalidCoordinates {
            latitude: position.latitude,
            longitude: position.longitude,
        });
    }

    position.source = source;
    Ok(position)
}

fn parse_flat(
    object: &Map<String, Value>,
    source: PositionSource,
    fallback_timestamp: i64,
) -> Result<Position, FetchError> {
    let latitude = number_field(object, "latitude")?;
    let longitude = number_field(object, "longitude")?;

    let mut position = Position::new(
        latitude,
        longitude,
        timestamp_field(object).unwrap_or(fallback_timestamp),
        source,
    );
    position.altitude = optional_number(object, "altitude");
    position.velocity = optional_number(object, "velocity");
    position.visibility = object
        .get("visibility")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(position)
}

fn parse_legacy(
    object: &Map<String, Value>,
    source: PositionSource,
    fallback_timestamp: i64,
) -> Result<Position, FetchError> {
    match object.get("message").and_then(Value::as_str) {
        Some("success") => {}
        Some(other) => return Err(FetchError::ApiError(other.to_string())),
        None => return Err(FetchError::ApiError("missing message".to_string())),
    }

    let inner = object
        .get("iss_position")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::MissingData("iss_position".to_string()))?;

    let latitude = lenient_number_field(inner, "latitude")?;
    let longitude = lenient_number_field(inner, "longitude")?;

    Ok(Position::new(
        latitude,
        longitude,
        timestamp_field(object).unwrap_or(fallback_timestamp),
        source,
    ))
}

fn number_field(object: &Map<String, Value>, key: &str) -> Result<f64, FetchError> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| FetchError::MissingData(key.to_string()))
}

fn lenient_number_field(object: &Map<String, Value>, key: &str) -> Result<f64, FetchError> {
    let value = object
        .get(key)
        .ok_or_else(|| FetchError::MissingData(key.to_string()))?;

    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FetchError::MissingData(key.to_string()))
}

/// Present, finite, non-zero numbers only; zero means "not provided" upstream.
fn optional_number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v != 0.0)
}

fn timestamp_field(object: &Map<String, Value>) -> Option<i64> {
    let value = object.get("timestamp")?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|t| t.is_finite() && *t > 0.0).map(|t| t as i64))
        .filter(|t| *t > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_flat_shape() {
        let body = br#"{
            "name": "iss",
            "id": 25544,
            "latitude": 50.11496269845,
            "longitude": 118.07900427317,
            "altitude": 408.05526028199,
            "velocity": 27635.971970874,
            "visibility": "daylight",
            "footprint": 4446.1877699772,
            "timestamp": 1364069476,
            "units": "kilometers"
        }"#;

        let pos = parse_position(body, PositionSource::Primary, NOW).unwrap();
        assert!((pos.latitude - 50.11496269845).abs() < 1e-9);
        assert!((pos.longitude - 118.07900427317).abs() < 1e-9);
        assert_eq!(pos.altitude, Some(408.05526028199));
        assert_eq!(pos.velocity, Some(27635.971970874));
        assert_eq!(pos.visibility.as_deref(), Some("daylight"));
        assert_eq!(pos.timestamp, 1364069476);
        assert_eq!(pos.source, PositionSource::Primary);
    }

    #[test]
    fn test_flat_shape_without_optional_fields() {
        let body = br#"{"latitude": -12.5, "longitude": 33.25}"#;
        let pos = parse_position(body, PositionSource::Backup, NOW).unwrap();
        assert_eq!(pos.altitude, None);
        assert_eq!(pos.velocity, None);
        assert_eq!(pos.timestamp, NOW);
        assert_eq!(pos.source, PositionSource::Backup);
    }

    #[test]
    fn test_legacy_shape_with_string_coordinates() {
        let body = br#"{
            "message": "success",
            "timestamp": 1700000123,
            "iss_position": {"latitude": "-41.2917", "longitude": "174.7854"}
        }"#;

        let pos = parse_position(body, PositionSource::Backup, NOW).unwrap();
        assert!((pos.latitude - (-41.2917)).abs() < 1e-9);
        assert!((pos.longitude - 174.7854).abs() < 1e-9);
        assert_eq!(pos.timestamp, 1700000123);
        assert_eq!(pos.altitude, None);
    }

    #[test]
    fn test_legacy_shape_with_numeric_coordinates() {
        let body = br#"{"message": "success", "iss_position": {"latitude": 1.5, "longitude": 2.5}}"#;
        let pos = parse_position(body, PositionSource::Backup, NOW).unwrap();
        assert_eq!((pos.latitude, pos.longitude), (1.5, 2.5));
        assert_eq!(pos.timestamp, NOW);
    }

    #[test]
    fn test_legacy_failure_message() {
        let body = br#"{"message": "failure", "iss_position": {"latitude": "1", "longitude": "2"}}"#;
        let err = parse_position(body, PositionSource::Backup, NOW).unwrap_err();
        assert_eq!(err, FetchError::ApiError("failure".to_string()));
    }

    #[test]
    fn test_legacy_missing_inner_object() {
        let body = br#"{"message": "success", "iss_position": null}"#;
        let err = parse_position(body, PositionSource::Backup, NOW).unwrap_err();
        assert_eq!(err.code(), "MISSING_DATA");
    }

    #[test]
    fn test_not_json_is_invalid_format() {
        let err = parse_position(b"<html>busy</html>", PositionSource::Primary, NOW).unwrap_err();
        assert_eq!(err.code(), "INVALID_FORMAT");

        let err = parse_position(b"[1, 2]", PositionSource::Primary, NOW).unwrap_err();
        assert_eq!(err.code(), "INVALID_FORMAT");
    }

    #[test]
    fn test_string_coordinates_rejected_in_flat_shape() {
        let body = br#"{"latitude": "10", "longitude": 20}"#;
        let err = parse_position(body, PositionSource::Primary, NOW).unwrap_err();
        assert_eq!(err, FetchError::MissingData("latitude".to_string()));
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let body = br#"{"latitude": 95.0, "longitude": 20}"#;
        let err = parse_position(body, PositionSource::Primary, NOW).unwrap_err();
        assert_eq!(
            err,
            FetchError::InvalidCoordinates {
                latitude: 95.0,
                longitude: 20.0
            }
        );
    }
}
