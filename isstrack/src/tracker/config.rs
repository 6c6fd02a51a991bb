//! Tracker configuration.

use std::time::Duration;

/// Default poll interval.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(2000);

/// Default duration of the smoothing animation between two fixes.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(1500);

/// Default number of fixes kept in the orbital path.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 50;

/// Default consecutive failures before tracking pauses itself.
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Default animation frame period (about 60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Configuration for [`super::PositionTracker`] and its daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// How often a poll tick fires while tracking.
    pub update_interval: Duration,

    /// Length of the eased transition toward each new fix.
    pub animation_duration: Duration,

    /// Maximum fixes retained in the orbital path (FIFO).
    pub max_path_length: usize,

    /// Consecutive fetch errors that trigger an automatic pause.
    pub max_consecutive_errors: u32,

    /// Frame period used by the daemon while an animation runs.
    pub frame_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl TrackerConfig {
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    pub fn with_max_path_length(mut self, len: usize) -> Self {
        self.max_path_length = len;
        self
    }

    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}
