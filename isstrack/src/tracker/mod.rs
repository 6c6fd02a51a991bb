//! Position tracking with smooth animation.
//!
//! The tracker polls a [`PositionFeed`] on an interval and keeps three views
//! of the tracked object:
//!
//! - the **target**: the latest accepted fix, delivered to position listeners
//! - the **current** position: what a display should draw, eased toward the
//!   target along the great circle over the animation duration
//! - the **orbital path**: a bounded FIFO trail of recent fixes
//!
//! # Architecture
//!
//! ```text
//!                    TrackerHandle (clone per consumer)
//!                           │ commands
//!                           ▼
//! ┌──────────────── TrackerDaemon (tokio task) ────────────────┐
//! │  poll interval ──► PositionTracker::poll_tick_with_frames  │
//! │  frame interval ─► PositionTracker::advance_frame          │
//! └───────────────────────────┬────────────────────────────────┘
//!                             │ watch<Option<Position>>
//!                             ▼
//!                          display
//! ```
//!
//! [`PositionTracker`] itself owns no timers, so it can be driven by hand
//! with a [`ManualClock`](crate::clock::ManualClock) in tests.
//!
//! # Failure handling
//!
//! A failed poll cycle increments the error counters and is delivered to
//! error listeners. After `max_consecutive_errors` failures in a row the
//! tracker pauses itself; [`PositionTracker::retry_connection`] clears the
//! counters, resets the feed and resumes.

mod animation;
mod config;
mod daemon;
mod feed;
mod listeners;
mod path;
mod state;
#[allow(clippy::module_inception)]
mod tracker;

pub use animation::{ease_in_out_cubic, interpolate_positions, Animation, Frame};
pub use config::{
    TrackerConfig, DEFAULT_ANIMATION_DURATION, DEFAULT_FRAME_INTERVAL,
    DEFAULT_MAX_CONSECUTIVE_ERRORS, DEFAULT_MAX_PATH_LENGTH, DEFAULT_UPDATE_INTERVAL,
};
pub use daemon::{TrackerCommand, TrackerDaemon, TrackerHandle};
pub use feed::PositionFeed;
pub use listeners::{ErrorListener, Listeners, PositionListener, StatusListener};
pub use path::OrbitalPath;
pub use state::{PerformanceMetrics, StatusEvent, TrackerError, TrackerStatus, TrackingState};
pub use tracker::PositionTracker;
