//! Resilient ISS position fetching.
//!
//! The fetcher polls two REST endpoints and always produces a position:
//! live data when an endpoint answers, a recent cached fix when both fail,
//! and a synthetic demo orbit as the last resort. A circuit breaker stops
//! hammering dead upstreams.
//!
//! # Architecture
//!
//! ```text
//! PositionFetcher
//!   ├── HttpTransport     (reqwest in production, mocks in tests)
//!   ├── payload           (flat / legacy JSON → Position)
//!   ├── CircuitBreaker    (consecutive failed cycles → cooldown)
//!   ├── ResponseCache     (single slot, max age)
//!   ├── StatsRecorder     (counters, EMA response time, error ring)
//!   └── demo_position     (closed-form orbit)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use isstrack::clock::SystemClock;
//! use isstrack::fetcher::{FetcherConfig, PositionFetcher, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new()?;
//! let mut fetcher = PositionFetcher::new(transport, SystemClock, FetcherConfig::default());
//! let position = fetcher.fetch_position().await;
//! println!("{:.4}, {:.4} ({})", position.latitude, position.longitude, position.source);
//! ```

mod cache;
mod circuit_breaker;
mod client;
mod config;
mod demo;
mod error;
mod payload;
mod stats;
mod transport;

pub use cache::ResponseCache;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use client::PositionFetcher;
pub use config::{
    Endpoint, EndpointConfig, FetcherConfig, DEFAULT_BACKUP_URL, DEFAULT_CACHE_MAX_AGE,
    DEFAULT_CIRCUIT_COOLDOWN, DEFAULT_FAILURE_THRESHOLD, DEFAULT_MAX_ERROR_RECORDS,
    DEFAULT_PRIMARY_URL,
};
pub use demo::{demo_position, DEMO_ALTITUDE_KM, DEMO_VELOCITY_KMH};
pub use error::FetchError;
pub use payload::parse_position;
pub use stats::{CacheStatus, EndpointUsage, ErrorRecord, FetchStats};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
