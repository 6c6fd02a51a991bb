//! Circuit breaker for upstream requests.
//!
//! Counts consecutive failed fetch cycles. Once the count reaches the
//! threshold the circuit "opens" and the fetcher stops issuing requests for a
//! cooldown period, serving cached or demo data instead.
//!
//! # State Machine
//!
//! ```text
//! Closed --[failures >= threshold]--> Open
//! Open --[cooldown elapsed, checked on next fetch]--> Closed
//! Open --[manual reset]--> Closed
//! ```
//!
//! Snapshots use [`CircuitBreaker::state_at`], which already reports `Closed`
//! once the cooldown has elapsed even if no fetch has happened since.
//!
//! The breaker is owned by a single fetcher and mutated only through `&mut`,
//! so it carries no interior locking.

use std::time::Duration;

use serde::Serialize;

use super::config::{DEFAULT_CIRCUIT_COOLDOWN, DEFAULT_FAILURE_THRESHOLD};

/// Configuration for the circuit breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the circuit (default: 3).
    pub failure_threshold: u32,
    /// How long the circuit stays open (default: 30s).
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown: DEFAULT_CIRCUIT_COOLDOWN,
        }
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitState {
    /// Requests flow normally.
    Closed,
    /// Requests are short-circuited to cache/demo data.
    Open,
}

impl CircuitState {
    /// User-friendly display string.
    pub fn display_status(&self) -> &'static str {
        match self {
            CircuitState::Closed => "Live",
            CircuitState::Open => "Offline (cooling down)",
        }
    }
}

/// Consecutive-failure circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: CircuitState,
    failure_count: u32,
    /// Wall-clock millis at which the circuit opened.
    opened_at: Option<u64>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: CircuitState::Closed,
            failure_count: 0,
            opened_at: None,
        }
    }

    /// Record a failed cycle. Returns `true` if this failure opened the circuit.
    pub fn record_failure(&mut self, now_ms: u64) -> bool {
        self.failure_count = self.failure_count.saturating_add(1);

        if self.state == CircuitState::Closed
            && self.failure_count >= self.config.failure_threshold.max(1)
        {
            self.state = CircuitState::Open;
            self.opened_at = Some(now_ms);
            tracing::warn!(
                failures = self.failure_count,
                cooldown_secs = self.config.cooldown.as_secs(),
                "Circuit breaker OPENED - suspending upstream requests"
            );
            return true;
        }
        false
    }

    /// Record a successful cycle.
    pub fn record_success(&mut self) {
        self.failure_count = 0;
    }

    /// Whether requests are currently blocked.
    ///
    /// Closes the circuit (and returns `false`) once the cooldown has elapsed.
    pub fn is_open(&mut self, now_ms: u64) -> bool {
        if self.state == CircuitState::Closed {
            return false;
        }

        if self.cooled_down(now_ms) {
            tracing::info!("Circuit breaker CLOSED - cooldown elapsed");
            self.close();
            return false;
        }
        true
    }

    /// Close the circuit immediately and clear the failure count.
    pub fn reset(&mut self) {
        if self.state == CircuitState::Open {
            tracing::info!("Circuit breaker manually reset");
        }
        self.close();
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.opened_at = None;
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// State as of `now_ms`, counting an elapsed cooldown as closed.
    pub fn state_at(&self, now_ms: u64) -> CircuitState {
        match self.state {
            CircuitState::Open if self.cooled_down(now_ms) => CircuitState::Closed,
            state => state,
        }
    }

    /// Failure count as of `now_ms`; zero once the cooldown has elapsed.
    pub fn failure_count_at(&self, now_ms: u64) -> u32 {
        if self.state == CircuitState::Open && self.cooled_down(now_ms) {
            0
        } else {
            self.failure_count
        }
    }

    fn cooled_down(&self, now_ms: u64) -> bool {
        let opened_at = self.opened_at.unwrap_or(now_ms);
        let cooldown_ms = self.config.cooldown.as_millis() as u64;
        now_ms.saturating_sub(opened_at) >= cooldown_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown_ms: u64) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown: Duration::from_millis(cooldown_ms),
        })
    }

    #[test]
    fn test_initial_state() {
        let mut cb = breaker(3, 1000);
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(!cb.is_open(0));
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_default_config() {
        let config = CircuitBreakerConfig::default();
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.cooldown, Duration::from_secs(30));
    }

    #[test]
    fn test_opens_at_threshold() {
        let mut cb = breaker(3, 1000);
        assert!(!cb.record_failure(10));
        assert!(!cb.record_failure(20));
        assert!(cb.record_failure(30));
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(cb.is_open(31));
    }

    #[test]
    fn test_success_resets_count() {
        let mut cb = breaker(3, 1000);
        cb.record_failure(0);
        cb.record_failure(0);
        cb.record_success();
        assert!(!cb.record_failure(0));
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_closes_after_cooldown() {
        let mut cb = breaker(1, 1000);
        cb.record_failure(5_000);
        assert!(cb.is_open(5_999));
        assert!(!cb.is_open(6_000));
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_manual_reset() {
        let mut cb = breaker(1, 60_000);
        cb.record_failure(0);
        assert!(cb.is_open(1));
        cb.reset();
        assert!(!cb.is_open(2));
    }

    #[test]
    fn test_failures_while_open_do_not_reopen() {
        let mut cb = breaker(1, 1000);
        assert!(cb.record_failure(0));
        assert!(!cb.record_failure(500));
        // Cooldown is measured from the original trip
        assert!(!cb.is_open(1000));
    }

    #[test]
    fn test_state_at_reflects_elapsed_cooldown() {
        let mut cb = breaker(1, 1000);
        cb.record_failure(5_000);

        assert_eq!(cb.state_at(5_999), CircuitState::Open);
        assert_eq!(cb.failure_count_at(5_999), 1);
        assert_eq!(cb.state_at(6_000), CircuitState::Closed);
        assert_eq!(cb.failure_count_at(6_000), 0);
        // Read-only: the stored state waits for the next is_open check.
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_display_status() {
        assert_eq!(CircuitState::Closed.display_status(), "Live");
        assert_eq!(CircuitState::Open.display_status(), "Offline (cooling down)");
    }
}
