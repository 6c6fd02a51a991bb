//! Single-slot response cache for offline fallback.

use std::time::Duration;

use crate::position::{Position, PositionSource};

/// Holds the last valid position and when it was stored.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entry: Option<(Position, u64)>,
    max_age: Duration,
}

impl ResponseCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entry: None,
            max_age,
        }
    }

    /// Replace the cached position.
    pub fn store(&mut self, position: &Position, now_ms: u64) {
        self.entry = Some((position.clone(), now_ms));
    }

    /// Replay the cached position if it is still fresh.
    ///
    /// A stale entry is discarded. The returned copy is tagged with
    /// `source = Cache`, `cached = true` and its age.
    pub fn get(&mut self, now_ms: u64) -> Option<Position> {
        let age = self.age_ms(now_ms)?;

        if age > self.max_age.as_millis() as u64 {
            tracing::warn!(age_ms = age, "Cached position is too old, discarding");
            self.entry = None;
            return None;
        }

        let (position, _) = self.entry.as_ref()?;
        let mut replay = position.clone();
        replay.source = PositionSource::Cache;
        replay.cached = true;
        replay.cache_age_ms = Some(age);
        Some(replay)
    }

    /// Age of the cached entry, if any.
    pub fn age_ms(&self, now_ms: u64) -> Option<u64> {
        self.entry
            .as_ref()
            .map(|(_, stored_at)| now_ms.saturating_sub(*stored_at))
    }

    pub fn has_data(&self) -> bool {
        self.entry.is_some()
    }
}
