//! The position fetcher.
//!
//! [`PositionFetcher`] turns an unreliable pair of upstream endpoints into a
//! stream of plausible positions. Each call to
//! [`fetch_position`](PositionFetcher::fetch_position) walks the chain:
//!
//! ```text
//! circuit open? ──yes──────────────────────────────┐
//!      │ no                                        │
//! rate limit → GET current endpoint (timeout)      │
//!      │ fail, current == primary                  │
//!      └─→ switch to backup, GET backup            │
//!      │ all failed                                ▼
//!      └──────────────→ fresh cache? ──no──→ demo orbit
//! ```

use std::time::Duration;

use super::cache::ResponseCache;
use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use super::config::{Endpoint, FetcherConfig};
use super::demo::demo_position;
use super::error::FetchError;
use super::payload::parse_position;
use super::stats::{CacheStatus, FetchStats, StatsRecorder};
use super::transport::HttpTransport;
use crate::clock::Clock;
use crate::position::{Position, PositionSource};

/// Fetches positions with failover, caching and a circuit breaker.
pub struct PositionFetcher<T: HttpTransport, C: Clock> {
    transport: T,
    clock: C,
    config: FetcherConfig,
    current_endpoint: Endpoint,
    breaker: CircuitBreaker,
    cache: ResponseCache,
    stats: StatsRecorder,
    /// Wall-clock millis of the last request per endpoint.
    last_request_at: [Option<u64>; 2],
}

impl<T: HttpTransport, C: Clock> PositionFetcher<T, C> {
    /// Create a fetcher.
    pub fn new(transport: T, clock: C, config: FetcherConfig) -> Self {
        tracing::info!(
            primary = %config.primary.url,
            backup = %config.backup.url,
            "Position fetcher initialized"
        );

        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: config.failure_threshold,
            cooldown: config.circuit_cooldown,
        });

        Self {
            transport,
            clock,
            cache: ResponseCache::new(config.cache_max_age),
            stats: StatsRecorder::new(config.max_error_records),
            config,
            current_endpoint: Endpoint::Primary,
            breaker,
            last_request_at: [None, None],
        }
    }

    /// Fetch the current position, never failing.
    ///
    /// Falls back to the cached position (if younger than the cache max age)
    /// and finally to the deterministic demo orbit.
    pub async fn fetch_position(&mut self) -> Position {
        match self.try_fetch_live().await {
            Ok(position) => position,
            Err(e) => {
                let now = self.clock.now_millis();

                if let Some(cached) = self.cache.get(now) {
                    tracing::warn!(
                        error = %e,
                        cache_age_ms = cached.cache_age_ms,
                        "Using cached position due to upstream failure"
                    );
                    self.stats.record_cache_hit();
                    return cached;
                }

                tracing::warn!(error = %e, "All upstreams failed, serving demo position");
                self.stats.record_demo_fallback();
                demo_position(now)
            }
        }
    }

    /// Fetch a live position, returning the failure instead of falling back.
    ///
    /// Goes through the same circuit breaker, failover and caching as
    /// [`fetch_position`](Self::fetch_position); only the cache/demo
    /// substitution is skipped.
    pub async fn try_fetch_live(&mut self) -> Result<Position, FetchError> {
        let was_open = self.breaker.state() == CircuitState::Open;
        if self.breaker.is_open(self.clock.now_millis()) {
            tracing::debug!("Circuit open, skipping upstream request");
            return Err(FetchError::CircuitOpen);
        }
        if was_open {
            self.current_endpoint = Endpoint::Primary;
        }

        let endpoint = self.current_endpoint;
        let first_error = match self.request_with_retries(endpoint).await {
            Ok(position) => return Ok(self.accept(position)),
            Err(e) => e,
        };

        let mut last_error = first_error;
        if endpoint == Endpoint::Primary {
            tracing::info!(error = %last_error, "Primary endpoint failed, switching to backup");
            self.current_endpoint = Endpoint::Backup;

            match self.request_with_retries(Endpoint::Backup).await {
                Ok(position) => return Ok(self.accept(position)),
                Err(e) => {
                    tracing::warn!(error = %e, "Backup endpoint also failed");
                    last_error = e;
                }
            }
        }

        self.breaker.record_failure(self.clock.now_millis());
        Err(last_error)
    }

    /// Close the circuit, clear the failure count and return to the primary.
    pub fn reset_circuit_breaker(&mut self) {
        self.breaker.reset();
        self.current_endpoint = Endpoint::Primary;
    }

    /// Force subsequent requests to start at the backup endpoint.
    pub fn switch_to_backup(&mut self) {
        tracing::info!("Manually switching to backup endpoint");
        self.current_endpoint = Endpoint::Backup;
    }

    /// Force subsequent requests to start at the primary endpoint.
    pub fn switch_to_primary(&mut self) {
        tracing::info!("Switching back to primary endpoint");
        self.current_endpoint = Endpoint::Primary;
    }

    pub fn current_endpoint(&self) -> Endpoint {
        self.current_endpoint
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Snapshot of request statistics.
    pub fn stats(&self) -> FetchStats {
        let now = self.clock.now_millis();
        self.stats.snapshot(
            self.current_endpoint,
            self.breaker.state_at(now),
            self.breaker.failure_count_at(now),
            CacheStatus {
                has_data: self.cache.has_data(),
                age_ms: self.cache.age_ms(now),
            },
        )
    }

    fn accept(&mut self, mut position: Position) -> Position {
        let now = self.clock.now_millis();
        position.received_at = Some(now);
        self.cache.store(&position, now);
        self.breaker.record_success();

        tracing::debug!(
            latitude = position.latitude,
            longitude = position.longitude,
            source = %position.source,
            "Position fetched"
        );
        position
    }

    async fn request_with_retries(&mut self, endpoint: Endpoint) -> Result<Position, FetchError> {
        let retries = self.config.endpoint(endpoint).retries;
        let retry_delay = self.config.endpoint(endpoint).retry_delay;

        let mut attempt = 0;
        loop {
            match self.request(endpoint).await {
                Ok(position) => return Ok(position),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    tracing::debug!(
                        %endpoint,
                        error = %e,
                        attempt,
                        retries,
                        "Retrying endpoint"
                    );
                    if !retry_delay.is_zero() {
                        tokio::time::sleep(retry_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One rate-limited, time-bounded GET against an endpoint.
    async fn request(&mut self, endpoint: Endpoint) -> Result<Position, FetchError> {
        self.apply_rate_limit(endpoint).await;

        let config = self.config.endpoint(endpoint);
        let url = config.url.clone();
        let timeout = config.timeout;

        let started = self.clock.now_millis();
        let outcome = match tokio::time::timeout(timeout, self.transport.get(&url, timeout)).await
        {
            Err(_) => Err(FetchError::Timeout),
            Ok(Err(e)) => Err(e),
            Ok(Ok(response)) if !response.is_success() => Err(FetchError::Http {
                status: response.status,
            }),
            Ok(Ok(response)) => parse_position(
                &response.body,
                source_for(endpoint),
                self.clock.now_secs(),
            ),
        };

        let now = self.clock.now_millis();
        let elapsed = now.saturating_sub(started);
        match &outcome {
            Ok(_) => self.stats.record_success(endpoint, elapsed),
            Err(e) => {
                tracing::debug!(%endpoint, error = %e, code = e.code(), "Request failed");
                self.stats.record_failure(endpoint, e, elapsed, now);
            }
        }
        outcome
    }

    async fn apply_rate_limit(&mut self, endpoint: Endpoint) {
        let min_interval = self.config.endpoint(endpoint).rate_limit.as_millis() as u64;
        let slot = endpoint.index();

        if min_interval > 0 {
            if let Some(last) = self.last_request_at[slot] {
                let since = self.clock.now_millis().saturating_sub(last);
                if since < min_interval {
                    let delay = min_interval - since;
                    tracing::debug!(%endpoint, delay_ms = delay, "Rate limiting");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }

        self.last_request_at[slot] = Some(self.clock.now_millis());
    }
}

fn source_for(endpoint: Endpoint) -> PositionSource {
    match endpoint {
        Endpoint::Primary => PositionSource::Primary,
        Endpoint::Backup => PositionSource::Backup,
    }
}
