//! Position source abstraction for the tracker.

use std::future::Future;

use crate::clock::Clock;
use crate::fetcher::{FetchError, FetchStats, HttpTransport, PositionFetcher};
use crate::position::Position;

/// Something the tracker can poll for positions.
///
/// [`PositionFetcher`] never fails (it falls back to cache or demo data), but
/// other feeds may, and the tracker treats an `Err` as a failed poll cycle.
pub trait PositionFeed: Send {
    /// Produce the next position.
    fn fetch_position(&mut self) -> impl Future<Output = Result<Position, FetchError>> + Send;

    /// Diagnostic statistics, if the feed keeps any.
    fn stats(&self) -> Option<FetchStats> {
        None
    }

    /// Clear any failure state (called on retry).
    fn reset(&mut self) {}
}

impl<T: HttpTransport, C: Clock> PositionFeed for PositionFetcher<T, C> {
    async fn fetch_position(&mut self) -> Result<Position, FetchError> {
        Ok(PositionFetcher::fetch_position(self).await)
    }

    fn stats(&self) -> Option<FetchStats> {
        Some(PositionFetcher::stats(self))
    }

    fn reset(&mut self) {
        self.reset_circuit_breaker();
    }
}
