//! Error types for the position fetcher.

use thiserror::Error;

/// Why a live position could not be obtained.
///
/// These never escape [`super::PositionFetcher::fetch_position`], which falls
/// back to cached or demo data instead; they are recorded in the statistics
/// and returned only from the direct [`super::PositionFetcher::try_fetch_live`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The endpoint did not answer within its timeout.
    #[error("Request timeout")]
    Timeout,

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Connection-level failure (DNS, TLS, reset, client construction).
    #[error("Network error: {0}")]
    Network(String),

    /// The body was not a JSON object.
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// The body lacked usable coordinate fields.
    #[error("Missing or invalid coordinate data: {0}")]
    MissingData(String),

    /// The legacy wrapper reported a non-success message.
    #[error("API returned error: {0}")]
    ApiError(String),

    /// Coordinates were numbers but outside the geographic ranges.
    #[error("Invalid coordinates in API response: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// The circuit breaker is open; no request was attempted.
    #[error("Circuit breaker is open")]
    CircuitOpen,
}

impl FetchError {
    /// Stable machine-readable code used in error records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::InvalidFormat(_) => "INVALID_FORMAT",
            Self::MissingData(_) => "MISSING_DATA",
            Self::ApiError(_) => "API_ERROR",
            Self::InvalidCoordinates { .. } => "INVALID_COORDINATES",
            Self::CircuitOpen => "CIRCUIT_OPEN",
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// True for failures of the response body rather than the transport.
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_)
                | Self::MissingData(_)
                | Self::ApiError(_)
                | Self::InvalidCoordinates { .. }
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(FetchError::Timeout.code(), "TIMEOUT");
        assert_eq!(FetchError::Http { status: 503 }.code(), "HTTP_ERROR");
        assert_eq!(FetchError::CircuitOpen.code(), "CIRCUIT_OPEN");
        assert_eq!(
            FetchError::InvalidCoordinates {
                latitude: 95.0,
                longitude: 0.0
            }
            .code(),
            "INVALID_COORDINATES"
        );
    }

    #[test]
    fn test_http_status_and_display() {
        let err = FetchError::Http { status: 429 };
        assert_eq!(err.http_status(), Some(429));
        assert_eq!(err.to_string(), "HTTP 429");
        assert_eq!(FetchError::Timeout.http_status(), None);
    }

    #[test]
    fn test_payload_classification() {
        assert!(FetchError::MissingData("latitude".into()).is_payload_error());
        assert!(!FetchError::Network("reset".into()).is_payload_error());
        assert!(!FetchError::Timeout.is_payload_error());
    }
}
