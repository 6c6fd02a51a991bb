//! The position tracker state machine.
//!
//! [`PositionTracker`] owns the polling lifecycle and the displayed position.
//! It has no timers of its own: something else calls
//! [`poll_tick`](PositionTracker::poll_tick) on every update interval and
//! [`advance_frame`](PositionTracker::advance_frame) on every display frame.
//! [`TrackerDaemon`](super::TrackerDaemon) does both on the tokio runtime;
//! tests do it by hand with a manual clock.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::animation::Animation;
use super::config::TrackerConfig;
use super::feed::PositionFeed;
use super::listeners::Listeners;
use super::path::OrbitalPath;
use super::state::{PerformanceMetrics, StatusEvent, TrackerError, TrackerStatus, TrackingState};
use crate::clock::Clock;
use crate::fetcher::FetchError;
use crate::position::Position;

/// Polls a [`PositionFeed`] and smooths the result for display.
pub struct PositionTracker<F: PositionFeed, C: Clock> {
    feed: F,
    clock: C,
    config: TrackerConfig,
    state: TrackingState,
    /// Position currently displayed (interpolated while animating).
    current_position: Option<Position>,
    /// Displayed position when the latest fix arrived.
    previous_position: Option<Position>,
    /// Latest accepted fix.
    target_position: Option<Position>,
    animation: Option<Animation>,
    path: OrbitalPath,
    listeners: Listeners,
    error_count: u32,
    consecutive_errors: u32,
    metrics: PerformanceMetrics,
}

impl<F: PositionFeed, C: Clock> PositionTracker<F, C> {
    pub fn new(feed: F, clock: C, config: TrackerConfig) -> Self {
        tracing::debug!(
            update_interval_ms = config.update_interval.as_millis() as u64,
            max_path_length = config.max_path_length,
            "Position tracker initialized"
        );

        Self {
            feed,
            clock,
            path: OrbitalPath::new(config.max_path_length),
            config,
            state: TrackingState::Idle,
            current_position: None,
            previous_position: None,
            target_position: None,
            animation: None,
            listeners: Listeners::new(),
            error_count: 0,
            consecutive_errors: 0,
            metrics: PerformanceMetrics::default(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start tracking and fetch the first position immediately.
    ///
    /// No-op (with a warning) if tracking is already active or paused.
    pub async fn start_tracking(&mut self) {
        if self.begin_tracking() {
            // Errors are already reported to listeners.
            let _ = self.fetch_and_update().await;
        }
    }

    /// Enter the active state. Returns `true` if tracking started and the
    /// first fetch is now due.
    pub(crate) fn begin_tracking(&mut self) -> bool {
        if self.state.is_tracking() {
            tracing::warn!(state = %self.state, "Tracking already active");
            return false;
        }

        self.state = TrackingState::Active;
        self.error_count = 0;
        self.consecutive_errors = 0;
        tracing::info!(
            interval_ms = self.config.update_interval.as_millis() as u64,
            "Tracking started"
        );
        self.listeners.emit_status(StatusEvent::TrackingStarted);
        true
    }

    /// Stop tracking. No-op (with a warning) when idle.
    pub fn stop_tracking(&mut self) {
        if !self.state.is_tracking() {
            tracing::warn!("Tracking not active");
            return;
        }

        self.state = TrackingState::Idle;
        tracing::info!("Tracking stopped");
        self.listeners.emit_status(StatusEvent::TrackingStopped);
    }

    /// Pause polling. Ticks keep arriving but are skipped.
    ///
    /// No-op (with a warning) unless tracking is active.
    pub fn pause_tracking(&mut self) {
        if self.state != TrackingState::Active {
            tracing::warn!(state = %self.state, "Cannot pause - tracking not active");
            return;
        }

        self.state = TrackingState::Paused;
        tracing::info!("Tracking paused");
        self.listeners.emit_status(StatusEvent::TrackingPaused);
    }

    /// Resume polling. No-op (with a warning) unless paused.
    pub fn resume_tracking(&mut self) {
        if self.state != TrackingState::Paused {
            tracing::warn!(state = %self.state, "Cannot resume - tracking not paused");
            return;
        }

        self.state = TrackingState::Active;
        tracing::info!("Tracking resumed");
        self.listeners.emit_status(StatusEvent::TrackingResumed);
    }

    /// Clear error counters, reset the feed and get tracking going again.
    ///
    /// Resumes a paused tracker and starts an idle one.
    pub async fn retry_connection(&mut self) {
        if self.begin_retry() {
            let _ = self.fetch_and_update().await;
        }
    }

    /// Synchronous part of [`retry_connection`](Self::retry_connection).
    /// Returns `true` if an idle tracker was started and needs its first fetch.
    pub(crate) fn begin_retry(&mut self) -> bool {
        tracing::info!("Retrying tracking connection");

        self.error_count = 0;
        self.consecutive_errors = 0;
        self.feed.reset();

        match self.state {
            TrackingState::Paused => {
                self.resume_tracking();
                false
            }
            TrackingState::Idle => self.begin_tracking(),
            TrackingState::Active => false,
        }
    }

    /// Change the poll interval.
    ///
    /// A running tracker goes through a full stop/start cycle, so status
    /// listeners see `tracking_stopped` followed by `tracking_started` and a
    /// fresh fetch is made.
    pub async fn set_update_interval(&mut self, interval: Duration) {
        if self.change_interval(interval) {
            let _ = self.fetch_and_update().await;
        }
    }

    /// Synchronous part of [`set_update_interval`](Self::set_update_interval).
    /// Returns `true` if a running tracker was restarted and needs a fetch.
    pub(crate) fn change_interval(&mut self, interval: Duration) -> bool {
        let was_tracking = self.state.is_tracking();
        if was_tracking {
            self.stop_tracking();
        }

        self.config.update_interval = interval;
        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            "Update interval changed"
        );

        was_tracking && self.begin_tracking()
    }

    /// Stop tracking and drop every listener.
    pub fn destroy(&mut self) {
        if self.state.is_tracking() {
            self.stop_tracking();
        }
        self.animation = None;
        self.listeners.clear();
        tracing::debug!("Position tracker destroyed");
    }

    // =========================================================================
    // Polling
    // =========================================================================

    /// Handle one poll tick. Fetches only while active.
    ///
    /// Returns `None` when the tick was skipped.
    pub async fn poll_tick(&mut self) -> Option<Result<Position, TrackerError>> {
        if self.state != TrackingState::Active {
            tracing::trace!(state = %self.state, "Skipping poll tick");
            return None;
        }
        Some(self.fetch_and_update().await)
    }

    /// Fetch one position and apply it.
    ///
    /// Failures are counted and delivered to error listeners (and returned);
    /// enough consecutive failures pause tracking.
    pub async fn fetch_and_update(&mut self) -> Result<Position, TrackerError> {
        let started = self.begin_update();
        let result = self.feed.fetch_position().await;
        self.finish_update(result, started)
    }

    /// Poll tick that keeps animation frames running while the fetch is in
    /// flight.
    ///
    /// Returns `None` if the tick was skipped or `shutdown` fired before the
    /// fetch completed (the fetch is then abandoned).
    pub(crate) async fn poll_tick_with_frames(
        &mut self,
        frame_interval: Duration,
        shutdown: &CancellationToken,
        on_frame: impl FnMut(&Position),
    ) -> Option<Result<Position, TrackerError>> {
        if self.state != TrackingState::Active {
            return None;
        }
        self.update_with_frames(frame_interval, shutdown, on_frame).await
    }

    /// Fetch and apply one position, stepping the animation every
    /// `frame_interval` until the fetch completes.
    ///
    /// `on_frame` sees the displayed position after each step. Returns `None`
    /// if `shutdown` fired first; the fetch is abandoned and nothing is
    /// counted as an error.
    pub(crate) async fn update_with_frames(
        &mut self,
        frame_interval: Duration,
        shutdown: &CancellationToken,
        mut on_frame: impl FnMut(&Position),
    ) -> Option<Result<Position, TrackerError>> {
        let started = self.begin_update();

        let result = {
            let Self {
                feed,
                clock,
                animation,
                current_position,
                ..
            } = &mut *self;

            let fetch = feed.fetch_position();
            tokio::pin!(fetch);
            let mut frames = tokio::time::interval(frame_interval);
            frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;

                    _ = shutdown.cancelled() => {
                        tracing::debug!("Abandoning in-flight fetch on shutdown");
                        return None;
                    }

                    result = &mut fetch => break result,

                    _ = frames.tick(), if animation.is_some() => {
                        step_animation(animation, current_position, clock.now_millis());
                        if let Some(displayed) = current_position.as_ref() {
                            on_frame(displayed);
                        }
                    }
                }
            }
        };

        Some(self.finish_update(result, started))
    }

    fn begin_update(&mut self) -> u64 {
        self.metrics.update_count += 1;
        self.clock.now_millis()
    }

    fn finish_update(
        &mut self,
        result: Result<Position, FetchError>,
        started_ms: u64,
    ) -> Result<Position, TrackerError> {
        let outcome = result.map_err(TrackerError::from).and_then(|position| {
            if position.is_valid() {
                Ok(position)
            } else {
                Err(TrackerError::InvalidPosition {
                    latitude: position.latitude,
                    longitude: position.longitude,
                })
            }
        });

        match outcome {
            Ok(position) => {
                self.apply_position(position.clone(), started_ms);
                Ok(position)
            }
            Err(e) => {
                self.handle_error(&e);
                Err(e)
            }
        }
    }

    fn apply_position(&mut self, position: Position, started_ms: u64) {
        let now = self.clock.now_millis();

        self.previous_position = self.current_position.clone();
        match self.current_position.clone() {
            // First fix: jump straight there.
            None => {
                self.current_position = Some(position.clone());
                self.animation = None;
            }
            Some(from) => {
                self.animation = Some(Animation::new(
                    from,
                    position.clone(),
                    now,
                    self.config.animation_duration.as_millis() as u64,
                ));
            }
        }

        self.target_position = Some(position.clone());
        self.path.push(position.clone());
        self.consecutive_errors = 0;
        self.metrics.last_update_ms = Some(now);
        self.metrics.record_duration(now.saturating_sub(started_ms));

        tracing::debug!(
            latitude = position.latitude,
            longitude = position.longitude,
            source = %position.source,
            "Position updated"
        );
        self.listeners.emit_position(&position);
    }

    fn handle_error(&mut self, error: &TrackerError) {
        self.error_count += 1;
        self.consecutive_errors += 1;

        tracing::warn!(
            error = %error,
            code = error.code(),
            consecutive_errors = self.consecutive_errors,
            "Failed to update position"
        );
        self.listeners.emit_error(error);

        if self.consecutive_errors >= self.config.max_consecutive_errors
            && self.state == TrackingState::Active
        {
            tracing::warn!(
                consecutive_errors = self.consecutive_errors,
                "Too many consecutive errors, pausing tracking"
            );
            self.pause_tracking();
        }
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Step the animation to the current time.
    ///
    /// Returns `true` while an animation is still running. Frames move the
    /// displayed position only; they never notify position listeners.
    pub fn advance_frame(&mut self) -> bool {
        let now = self.clock.now_millis();
        step_animation(&mut self.animation, &mut self.current_position, now)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a listener for each new fix.
    pub fn on_position_update(&mut self, listener: impl Fn(&Position) + Send + Sync + 'static) {
        self.listeners.add_position(Box::new(listener));
    }

    /// Register a listener for failed poll cycles.
    pub fn on_error(&mut self, listener: impl Fn(&TrackerError) + Send + Sync + 'static) {
        self.listeners.add_error(Box::new(listener));
    }

    /// Register a listener for lifecycle transitions.
    pub fn on_status_change(&mut self, listener: impl Fn(StatusEvent) + Send + Sync + 'static) {
        self.listeners.add_status(Box::new(listener));
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn current_position(&self) -> Option<&Position> {
        self.current_position.as_ref()
    }

    pub fn target_position(&self) -> Option<&Position> {
        self.target_position.as_ref()
    }

    /// Displayed position at the moment the latest fix was applied.
    pub fn previous_position(&self) -> Option<&Position> {
        self.previous_position.as_ref()
    }

    /// Copy of the orbital path, oldest first.
    pub fn orbital_path(&self) -> Vec<Position> {
        self.path.to_vec()
    }

    pub fn clear_orbital_path(&mut self) {
        self.path.clear();
        tracing::debug!("Orbital path cleared");
    }

    pub fn update_interval(&self) -> Duration {
        self.config.update_interval
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }

    /// Full read-only snapshot.
    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            state: self.state,
            is_animating: self.animation.is_some(),
            current_position: self.current_position.clone(),
            previous_position: self.previous_position.clone(),
            target_position: self.target_position.clone(),
            error_count: self.error_count,
            consecutive_errors: self.consecutive_errors,
            orbital_path_length: self.path.len(),
            update_interval_ms: self.config.update_interval.as_millis() as u64,
            metrics: self.metrics,
            fetcher: self.feed.stats(),
        }
    }
}

/// Advance `animation` to `now_ms`, writing the sampled position into
/// `current`. Clears the animation once it finishes.
fn step_animation(
    animation: &mut Option<Animation>,
    current: &mut Option<Position>,
    now_ms: u64,
) -> bool {
    let Some(running) = animation.as_ref() else {
        return false;
    };

    let frame = running.sample(now_ms);
    tracing::trace!(
        progress = frame.progress,
        latitude = frame.position.latitude,
        longitude = frame.position.longitude,
        "Animation frame"
    );
    *current = Some(frame.position);

    if frame.finished {
        *animation = None;
    }
    !frame.finished
}
