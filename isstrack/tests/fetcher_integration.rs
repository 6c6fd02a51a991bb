//! Integration tests for the position fetcher.
//!
//! These tests drive [`PositionFetcher`] through its public API with a
//! scripted transport and a manual clock, verifying:
//! - Failover from a timing-out primary to the backup
//! - Cache replay after consecutive failures within the cache max age
//! - Circuit breaker short-circuiting (no network calls while open)
//! - Recovery once the cooldown has elapsed

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use isstrack::clock::ManualClock;
use isstrack::fetcher::{
    CircuitState, Endpoint, EndpointConfig, FetchError, FetcherConfig, HttpResponse,
    HttpTransport, PositionFetcher,
};
use isstrack::position::PositionSource;

// =============================================================================
// Test Helpers
// =============================================================================

const PRIMARY: &str = "http://primary.test/iss";
const BACKUP: &str = "http://backup.test/iss";
const START_MS: u64 = 1_700_000_000_000;

const PRIMARY_BODY: &str = r#"{"latitude": 48.8, "longitude": 2.35, "altitude": 418.0,
    "velocity": 27580.0, "timestamp": 1700000000}"#;
const BACKUP_BODY: &str = r#"{"message": "success", "timestamp": 1700000002,
    "iss_position": {"latitude": "-33.9", "longitude": "151.2"}}"#;

/// How an endpoint answers.
#[derive(Clone)]
enum Behavior {
    Ok(&'static str),
    Down,
    Hang,
}

/// Transport with per-URL behavior and a call counter.
#[derive(Clone, Default)]
struct ScriptedTransport {
    behavior: Arc<Mutex<HashMap<&'static str, Behavior>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    fn set(&self, url: &'static str, behavior: Behavior) {
        self.behavior.lock().unwrap().insert(url, behavior);
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let behavior = self
            .behavior
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Behavior::Down);

        match behavior {
            Behavior::Ok(body) => Ok(HttpResponse::new(200, body)),
            Behavior::Down => Err(FetchError::Network("connection refused".to_string())),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

fn setup() -> (
    ScriptedTransport,
    ManualClock,
    PositionFetcher<ScriptedTransport, ManualClock>,
) {
    let transport = ScriptedTransport::default();
    let clock = ManualClock::new(START_MS);
    let config = FetcherConfig::with_endpoints(
        EndpointConfig::new(PRIMARY, Duration::from_millis(40)),
        EndpointConfig::new(BACKUP, Duration::from_millis(40)),
    );
    let fetcher = PositionFetcher::new(transport.clone(), clock.clone(), config);
    (transport, clock, fetcher)
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn test_timing_out_primary_fails_over_to_backup() {
    let (transport, _clock, mut fetcher) = setup();
    transport.set(PRIMARY, Behavior::Hang);
    transport.set(BACKUP, Behavior::Ok(BACKUP_BODY));

    let position = fetcher.fetch_position().await;

    assert_eq!(position.source, PositionSource::Backup);
    assert_eq!(position.latitude, -33.9);
    assert_eq!(position.longitude, 151.2);
    assert!(!position.cached);

    let stats = fetcher.stats();
    assert_eq!(stats.failed_requests, 1);
    assert_eq!(stats.successful_requests, 1);
    assert_eq!(stats.errors.len(), 1);
    assert_eq!(stats.errors[0].code, "TIMEOUT");
    assert_eq!(stats.errors[0].endpoint, Endpoint::Primary);
    assert_eq!(stats.current_endpoint, Endpoint::Backup);
    assert_eq!(stats.circuit_state, CircuitState::Closed);
    assert_eq!(transport.calls_to(PRIMARY), 1);
}

#[tokio::test]
async fn test_cache_replayed_after_two_failures() {
    let (transport, clock, mut fetcher) = setup();
    transport.set(PRIMARY, Behavior::Ok(PRIMARY_BODY));

    let live = fetcher.fetch_position().await;
    assert_eq!(live.source, PositionSource::Primary);

    transport.set(PRIMARY, Behavior::Down);
    transport.set(BACKUP, Behavior::Down);

    clock.advance(Duration::from_secs(2));
    let first = fetcher.fetch_position().await;
    clock.advance(Duration::from_secs(2));
    let second = fetcher.fetch_position().await;

    for replay in [&first, &second] {
        assert_eq!(replay.source, PositionSource::Cache);
        assert!(replay.cached);
        assert_eq!(replay.latitude, 48.8);
        assert_eq!(replay.longitude, 2.35);
    }
    assert_eq!(second.cache_age_ms, Some(4_000));

    let stats = fetcher.stats();
    assert_eq!(stats.cache_hits, 2);
    assert_eq!(stats.demo_fallbacks, 0);
    assert_eq!(stats.circuit_state, CircuitState::Closed);
}

#[tokio::test]
async fn test_open_circuit_makes_no_requests() {
    let (transport, clock, mut fetcher) = setup();
    transport.set(PRIMARY, Behavior::Ok(PRIMARY_BODY));
    fetcher.fetch_position().await;

    transport.set(PRIMARY, Behavior::Down);
    transport.set(BACKUP, Behavior::Down);
    for _ in 0..3 {
        clock.advance(Duration::from_secs(1));
        fetcher.fetch_position().await;
    }
    assert!(fetcher.stats().circuit_open());

    let calls_when_opened = transport.calls();
    for _ in 0..5 {
        clock.advance(Duration::from_secs(1));
        let position = fetcher.fetch_position().await;
        assert!(matches!(
            position.source,
            PositionSource::Cache | PositionSource::Demo
        ));
    }
    assert_eq!(transport.calls(), calls_when_opened);

    let stats = fetcher.stats();
    assert!(stats
        .errors
        .iter()
        .all(|error| error.code == "NETWORK_ERROR"));
}

#[tokio::test]
async fn test_circuit_recovers_after_cooldown() {
    let (transport, clock, mut fetcher) = setup();
    for _ in 0..3 {
        fetcher.fetch_position().await;
    }
    assert!(fetcher.stats().circuit_open());

    let demo = fetcher.fetch_position().await;
    assert_eq!(demo.source, PositionSource::Demo);

    transport.set(PRIMARY, Behavior::Ok(PRIMARY_BODY));
    clock.advance(Duration::from_secs(31));

    let live = fetcher.fetch_position().await;
    assert_eq!(live.source, PositionSource::Primary);
    assert_eq!(fetcher.stats().circuit_state, CircuitState::Closed);
    assert_eq!(fetcher.current_endpoint(), Endpoint::Primary);
}

#[tokio::test]
async fn test_demo_positions_are_deterministic_during_outage() {
    let (_transport, clock, mut first) = setup();
    let (_other_transport, other_clock, mut second) = setup();
    clock.set(START_MS + 123_456);
    other_clock.set(START_MS + 123_456);

    let a = first.fetch_position().await;
    let b = second.fetch_position().await;

    assert_eq!(a.source, PositionSource::Demo);
    assert_eq!(a.latitude, b.latitude);
    assert_eq!(a.longitude, b.longitude);
    assert!(a.is_valid());
}
