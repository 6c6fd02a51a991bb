//! Core state types for position tracking.
//!
//! - [`TrackingState`] - Lifecycle state of the tracker
//! - [`StatusEvent`] - Lifecycle transitions reported to listeners
//! - [`TrackerError`] - Failures surfaced to error listeners
//! - [`PerformanceMetrics`] - Update counters and timings
//! - [`TrackerStatus`] - Full read-only snapshot for consumers

use serde::Serialize;
use thiserror::Error;

use crate::fetcher::{FetchError, FetchStats};
use crate::position::Position;

/// Lifecycle state of a tracker.
///
/// ```text
/// Idle --start--> Active --pause--> Paused --resume--> Active
///   ^                |                 |
///   +------stop------+-------stop------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    /// Not polling.
    #[default]
    Idle,
    /// Polling on every tick.
    Active,
    /// Ticks keep firing but no fetch is made.
    Paused,
}

impl TrackingState {
    /// True while polling is scheduled (active or paused).
    #[inline]
    pub fn is_tracking(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// Lifecycle transition delivered to status listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    TrackingStarted,
    TrackingStopped,
    TrackingPaused,
    TrackingResumed,
}

impl StatusEvent {
    /// Stable tag, e.g. `tracking_paused`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrackingStarted => "tracking_started",
            Self::TrackingStopped => "tracking_stopped",
            Self::TrackingPaused => "tracking_paused",
            Self::TrackingResumed => "tracking_resumed",
        }
    }
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported to error listeners.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// The feed could not produce a position.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The feed produced a position outside the valid coordinate range.
    #[error("Invalid position: ({latitude}, {longitude})")]
    InvalidPosition { latitude: f64, longitude: f64 },
}

impl TrackerError {
    /// Stable error code for display and logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch(e) => e.code(),
            Self::InvalidPosition { .. } => "INVALID_POSITION",
        }
    }
}

/// Update counters and timings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Fetch attempts made (successful or not).
    pub update_count: u64,

    /// Wall-clock millis of the last successful update.
    pub last_update_ms: Option<u64>,

    /// Rolling average duration of successful updates in milliseconds.
    pub average_update_ms: f64,
}

impl PerformanceMetrics {
    /// Fold one successful update duration into the rolling average.
    pub(crate) fn record_duration(&mut self, elapsed_ms: u64) {
        let sample = elapsed_ms as f64;
        self.average_update_ms = if self.average_update_ms == 0.0 {
            sample
        } else {
            self.average_update_ms * 0.9 + sample * 0.1
        };
    }
}

/// Read-only snapshot of a tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerStatus {
    pub state: TrackingState,
    pub is_animating: bool,
    /// Interpolated position currently shown.
    pub current_position: Option<Position>,
    /// Position shown when the latest fix arrived (the animation's start).
    pub previous_position: Option<Position>,
    /// Most recent fix the animation is heading to.
    pub target_position: Option<Position>,
    /// Errors since the last start or retry.
    pub error_count: u32,
    pub consecutive_errors: u32,
    pub orbital_path_length: usize,
    pub update_interval_ms: u64,
    pub metrics: PerformanceMetrics,
    /// Feed statistics, when the feed keeps any.
    pub fetcher: Option<FetchStats>,
}

impl TrackerStatus {
    pub fn is_active(&self) -> bool {
        self.state == TrackingState::Active
    }

    pub fn is_paused(&self) -> bool {
        self.state == TrackingState::Paused
    }
}
