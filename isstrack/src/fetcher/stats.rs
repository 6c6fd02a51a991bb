//! Rolling request statistics.
//!
//! Diagnostic only: nothing here feeds back into control flow.

use std::collections::VecDeque;

use serde::Serialize;

use super::circuit_breaker::CircuitState;
use super::config::Endpoint;
use super::error::FetchError;

/// Smoothing factor for the response time moving average.
const RESPONSE_TIME_ALPHA: f64 = 0.1;

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    /// Wall-clock millis of the failure.
    pub timestamp: u64,
    pub code: &'static str,
    pub message: String,
    pub endpoint: Endpoint,
}

/// Successful responses per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EndpointUsage {
    pub primary: u64,
    pub backup: u64,
}

/// Cache freshness as seen by [`FetchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub has_data: bool,
    pub age_ms: Option<u64>,
}

/// Snapshot of fetcher statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub cache_hits: u64,
    pub demo_fallbacks: u64,
    pub average_response_ms: f64,
    pub endpoint_usage: EndpointUsage,
    pub errors: Vec<ErrorRecord>,
    pub current_endpoint: Endpoint,
    pub circuit_state: CircuitState,
    pub failure_count: u32,
    /// Percentage of requests that succeeded.
    pub success_rate: f64,
    pub cache: CacheStatus,
}

impl FetchStats {
    pub fn circuit_open(&self) -> bool {
        self.circuit_state == CircuitState::Open
    }
}

/// Mutable counters owned by the fetcher.
#[derive(Debug, Clone)]
pub(crate) struct StatsRecorder {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    cache_hits: u64,
    demo_fallbacks: u64,
    average_response_ms: Option<f64>,
    endpoint_usage: EndpointUsage,
    errors: VecDeque<ErrorRecord>,
    max_errors: usize,
}

impl StatsRecorder {
    pub(crate) fn new(max_errors: usize) -> Self {
        Self {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            cache_hits: 0,
            demo_fallbacks: 0,
            average_response_ms: None,
            endpoint_usage: EndpointUsage::default(),
            errors: VecDeque::with_capacity(max_errors),
            max_errors,
        }
    }

    pub(crate) fn record_success(&mut self, endpoint: Endpoint, elapsed_ms: u64) {
        self.total_requests += 1;
        self.successful_requests += 1;
        match endpoint {
            Endpoint::Primary => self.endpoint_usage.primary += 1,
            Endpoint::Backup => self.endpoint_usage.backup += 1,
        }
        self.record_response_time(elapsed_ms);
    }

    pub(crate) fn record_failure(
        &mut self,
        endpoint: Endpoint,
        error: &FetchError,
        elapsed_ms: u64,
        now_ms: u64,
    ) {
        self.total_requests += 1;
        self.failed_requests += 1;
        self.record_response_time(elapsed_ms);

        if self.max_errors == 0 {
            return;
        }
        if self.errors.len() == self.max_errors {
            self.errors.pop_front();
        }
        self.errors.push_back(ErrorRecord {
            timestamp: now_ms,
            code: error.code(),
            message: error.to_string(),
            endpoint,
        });
    }

    pub(crate) fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub(crate) fn record_demo_fallback(&mut self) {
        self.demo_fallbacks += 1;
    }

    fn record_response_time(&mut self, elapsed_ms: u64) {
        let sample = elapsed_ms as f64;
        self.average_response_ms = Some(match self.average_response_ms {
            None => sample,
            Some(avg) => avg * (1.0 - RESPONSE_TIME_ALPHA) + sample * RESPONSE_TIME_ALPHA,
        });
    }

    pub(crate) fn snapshot(
        &self,
        current_endpoint: Endpoint,
        circuit_state: CircuitState,
        failure_count: u32,
        cache: CacheStatus,
    ) -> FetchStats {
        let success_rate = if self.total_requests > 0 {
            self.successful_requests as f64 / self.total_requests as f64 * 100.0
        } else {
            0.0
        };

        FetchStats {
            total_requests: self.total_requests,
            successful_requests: self.successful_requests,
            failed_requests: self.failed_requests,
            cache_hits: self.cache_hits,
            demo_fallbacks: self.demo_fallbacks,
            average_response_ms: self.average_response_ms.unwrap_or(0.0),
            endpoint_usage: self.endpoint_usage,
            errors: self.errors.iter().cloned().collect(),
            current_endpoint,
            circuit_state,
            failure_count,
            success_rate,
            cache,
        }
    }
}
