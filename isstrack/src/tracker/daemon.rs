//! Async driver for a [`PositionTracker`].
//!
//! The [`TrackerDaemon`] runs as an independent tokio task that:
//!
//! 1. Receives commands from cloneable [`TrackerHandle`]s
//! 2. Fires poll ticks on the tracker's update interval
//! 3. Steps animation frames while an animation is running
//! 4. Publishes the displayed position on a `watch` channel
//!
//! # Overlapping fetches
//!
//! A poll cycle runs inside the daemon task itself, so at most one fetch is
//! ever in flight. The poll interval uses [`MissedTickBehavior::Skip`]: a
//! tick that falls due while a slow fetch is still pending is dropped rather
//! than queued. Animation frames keep running and keep being published during
//! the fetch, and shutdown abandons it, including the first fetch after a
//! start, retry or interval change.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::feed::PositionFeed;
use super::state::TrackerStatus;
use super::tracker::PositionTracker;
use crate::clock::Clock;
use crate::position::Position;

/// Command channel capacity.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Control messages accepted by the daemon.
#[derive(Debug)]
pub enum TrackerCommand {
    Start,
    Stop,
    Pause,
    Resume,
    Retry,
    SetInterval(Duration),
    ClearPath,
    Status(oneshot::Sender<TrackerStatus>),
}

/// Cloneable handle for controlling a running daemon.
///
/// Control methods are non-blocking and return `false` if the command could
/// not be queued (daemon gone or channel full).
#[derive(Clone)]
pub struct TrackerHandle {
    command_tx: mpsc::Sender<TrackerCommand>,
    position_rx: watch::Receiver<Option<Position>>,
}

impl TrackerHandle {
    pub fn start(&self) -> bool {
        self.send(TrackerCommand::Start)
    }

    pub fn stop(&self) -> bool {
        self.send(TrackerCommand::Stop)
    }

    pub fn pause(&self) -> bool {
        self.send(TrackerCommand::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(TrackerCommand::Resume)
    }

    /// Reset error counters and the feed, then resume or start.
    pub fn retry(&self) -> bool {
        self.send(TrackerCommand::Retry)
    }

    /// Change the poll interval (restarts a running tracker).
    pub fn set_interval(&self, interval: Duration) -> bool {
        self.send(TrackerCommand::SetInterval(interval))
    }

    pub fn clear_path(&self) -> bool {
        self.send(TrackerCommand::ClearPath)
    }

    /// Ask the daemon for a status snapshot.
    ///
    /// Returns `None` if the daemon has shut down.
    pub async fn status(&self) -> Option<TrackerStatus> {
        let (tx, rx) = oneshot::channel();
        self.command_tx.send(TrackerCommand::Status(tx)).await.ok()?;
        rx.await.ok()
    }

    /// The most recently published displayed position.
    pub fn position(&self) -> Option<Position> {
        self.position_rx.borrow().clone()
    }

    /// Receiver that observes every published position.
    pub fn subscribe(&self) -> watch::Receiver<Option<Position>> {
        self.position_rx.clone()
    }

    fn send(&self, command: TrackerCommand) -> bool {
        match self.command_tx.try_send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to queue tracker command");
                false
            }
        }
    }
}

/// Drives a [`PositionTracker`] on the tokio runtime.
pub struct TrackerDaemon<F: PositionFeed, C: Clock> {
    tracker: PositionTracker<F, C>,
    command_rx: mpsc::Receiver<TrackerCommand>,
    position_tx: watch::Sender<Option<Position>>,
}

impl<F, C> TrackerDaemon<F, C>
where
    F: PositionFeed + 'static,
    C: Clock + 'static,
{
    /// Spawn the daemon.
    ///
    /// The tracker is handed back through the join handle once `shutdown`
    /// fires or every handle has been dropped; tracking is stopped by then.
    pub fn spawn(
        tracker: PositionTracker<F, C>,
        shutdown: CancellationToken,
    ) -> (TrackerHandle, JoinHandle<PositionTracker<F, C>>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (position_tx, position_rx) = watch::channel(tracker.current_position().cloned());

        let daemon = Self {
            tracker,
            command_rx,
            position_tx,
        };
        let join = tokio::spawn(daemon.run(shutdown));

        (
            TrackerHandle {
                command_tx,
                position_rx,
            },
            join,
        )
    }

    async fn run(mut self, shutdown: CancellationToken) -> PositionTracker<F, C> {
        tracing::info!("Tracker daemon starting");

        let frame_interval = self.tracker.config().frame_interval;
        let mut poll = poll_interval(self.tracker.update_interval());
        let mut frames = tokio::time::interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    tracing::info!("Tracker daemon shutting down");
                    break;
                }

                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("All tracker handles dropped");
                        break;
                    };
                    let was_tracking = self.tracker.state().is_tracking();
                    let interval = self.tracker.update_interval();

                    if self.handle_command(command) {
                        let position_tx = &self.position_tx;
                        self.tracker
                            .update_with_frames(frame_interval, &shutdown, |displayed| {
                                send_position(position_tx, Some(displayed))
                            })
                            .await;
                    }

                    // A fresh start fetched already; next poll one interval out.
                    let started = !was_tracking && self.tracker.state().is_tracking();
                    if started || interval != self.tracker.update_interval() {
                        poll = poll_interval(self.tracker.update_interval());
                    }
                    self.publish();
                }

                _ = poll.tick(), if self.tracker.state().is_tracking() => {
                    let position_tx = &self.position_tx;
                    if self
                        .tracker
                        .poll_tick_with_frames(frame_interval, &shutdown, |displayed| {
                            send_position(position_tx, Some(displayed))
                        })
                        .await
                        .is_some()
                    {
                        self.publish();
                    }
                }

                _ = frames.tick(), if self.tracker.is_animating() => {
                    self.tracker.advance_frame();
                    self.publish();
                }
            }
        }

        if self.tracker.state().is_tracking() {
            self.tracker.stop_tracking();
        }
        self.publish();
        tracing::debug!("Tracker daemon stopped");
        self.tracker
    }

    /// Apply a command. Returns `true` when it left a fetch to be made, which
    /// the run loop performs so shutdown can interrupt it.
    fn handle_command(&mut self, command: TrackerCommand) -> bool {
        tracing::debug!(?command, "Tracker command");
        match command {
            TrackerCommand::Start => return self.tracker.begin_tracking(),
            TrackerCommand::Stop => self.tracker.stop_tracking(),
            TrackerCommand::Pause => self.tracker.pause_tracking(),
            TrackerCommand::Resume => self.tracker.resume_tracking(),
            TrackerCommand::Retry => return self.tracker.begin_retry(),
            TrackerCommand::SetInterval(interval) => {
                return self.tracker.change_interval(interval)
            }
            TrackerCommand::ClearPath => self.tracker.clear_orbital_path(),
            TrackerCommand::Status(reply) => {
                // Requester may have given up.
                let _ = reply.send(self.tracker.status());
            }
        }
        false
    }

    fn publish(&self) {
        send_position(&self.position_tx, self.tracker.current_position());
    }
}

/// Send `position` to subscribers unless it is already the current value.
fn send_position(position_tx: &watch::Sender<Option<Position>>, position: Option<&Position>) {
    position_tx.send_if_modified(|current| {
        if current.as_ref() != position {
            *current = position.cloned();
            true
        } else {
            false
        }
    });
}

/// Poll timer whose first tick is one full interval from now.
fn poll_interval(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::fetcher::FetchError;
    use crate::position::PositionSource;
    use crate::tracker::{TrackerConfig, TrackingState};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Feed that takes `delay` per fetch and counts calls. The n-th fix sits
    /// at longitude n on the equator.
    struct SlowFeed {
        delay: Duration,
        calls: Arc<AtomicU32>,
    }

    impl PositionFeed for SlowFeed {
        async fn fetch_position(&mut self) -> Result<Position, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Position::new(0.0, n as f64, n as i64, PositionSource::Primary))
        }
    }

    fn spawn_with(
        delay: Duration,
        interval: Duration,
    ) -> (
        TrackerHandle,
        JoinHandle<PositionTracker<SlowFeed, SystemClock>>,
        Arc<AtomicU32>,
        CancellationToken,
    ) {
        spawn_with_animation(delay, interval, Duration::from_millis(30))
    }

    fn spawn_with_animation(
        delay: Duration,
        interval: Duration,
        animation: Duration,
    ) -> (
        TrackerHandle,
        JoinHandle<PositionTracker<SlowFeed, SystemClock>>,
        Arc<AtomicU32>,
        CancellationToken,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let feed = SlowFeed {
            delay,
            calls: Arc::clone(&calls),
        };
        let config = TrackerConfig::default()
            .with_update_interval(interval)
            .with_animation_duration(animation);
        let tracker = PositionTracker::new(feed, SystemClock, config);
        let token = CancellationToken::new();
        let (handle, join) = TrackerDaemon::spawn(tracker, token.clone());
        (handle, join, calls, token)
    }

    #[tokio::test]
    async fn test_start_publishes_position() {
        let (handle, join, _, token) = spawn_with(Duration::ZERO, Duration::from_secs(60));
        let mut positions = handle.subscribe();

        assert!(handle.start());
        tokio::time::timeout(Duration::from_secs(2), positions.changed())
            .await
            .expect("position published")
            .unwrap();
        assert!(handle.position().is_some());

        let status = handle.status().await.unwrap();
        assert_eq!(status.state, TrackingState::Active);

        token.cancel();
        let tracker = join.await.unwrap();
        assert_eq!(tracker.state(), TrackingState::Idle);
    }

    #[tokio::test]
    async fn test_pause_and_resume_commands() {
        let (handle, join, _, token) = spawn_with(Duration::ZERO, Duration::from_secs(60));

        handle.start();
        handle.pause();
        assert_eq!(handle.status().await.unwrap().state, TrackingState::Paused);

        handle.resume();
        handle.set_interval(Duration::from_secs(30));
        let status = handle.status().await.unwrap();
        assert_eq!(status.state, TrackingState::Active);
        assert_eq!(status.update_interval_ms, 30_000);

        handle.clear_path();
        assert_eq!(handle.status().await.unwrap().orbital_path_length, 0);

        token.cancel();
        join.await.unwrap();
    }

    #[tokio::test]
    async fn test_slow_fetch_skips_overlapping_ticks() {
        let (handle, join, calls, token) =
            spawn_with(Duration::from_millis(120), Duration::from_millis(20));

        handle.start();
        tokio::time::sleep(Duration::from_millis(400)).await;
        token.cancel();
        join.await.unwrap();

        // One fetch at a time: roughly 400 / 120, nowhere near 400 / 20.
        let made = calls.load(Ordering::SeqCst);
        assert!(made >= 2, "expected polling to continue, got {}", made);
        assert!(made <= 6, "expected overlapping ticks to be skipped, got {}", made);
    }

    #[tokio::test]
    async fn test_frames_are_published_while_fetch_is_in_flight() {
        // Each fetch outlasts the animation, so every animated transition
        // plays out while the next fetch is pending.
        let (handle, join, _, token) = spawn_with_animation(
            Duration::from_millis(200),
            Duration::from_millis(20),
            Duration::from_millis(150),
        );
        let mut positions = handle.subscribe();
        let collector = tokio::spawn(async move {
            let mut seen = Vec::new();
            while positions.changed().await.is_ok() {
                if let Some(p) = positions.borrow_and_update().clone() {
                    seen.push(p.longitude);
                }
            }
            seen
        });

        handle.start();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        token.cancel();
        join.await.unwrap();
        let seen = collector.await.unwrap();

        let interpolated = seen.iter().filter(|lon| lon.fract() != 0.0).count();
        assert!(
            interpolated >= 3,
            "expected interpolated frames between fixes, got {:?}",
            seen
        );
        let mut sorted = seen.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(seen, sorted, "displayed longitude should only move forward");
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_first_fetch() {
        let (handle, join, calls, token) =
            spawn_with(Duration::from_secs(30), Duration::from_secs(60));

        handle.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        token.cancel();
        let tracker = tokio::time::timeout(Duration::from_secs(2), join)
            .await
            .expect("shutdown does not wait for the pending fetch")
            .unwrap();
        assert_eq!(tracker.state(), TrackingState::Idle);
        assert_eq!(tracker.status().error_count, 0);
    }

    #[tokio::test]
    async fn test_dropping_handles_stops_daemon() {
        let (handle, join, _, _token) = spawn_with(Duration::ZERO, Duration::from_secs(60));
        handle.start();
        drop(handle);

        let tracker = tokio::time::timeout(Duration::from_secs(2), join)
            .await
            .expect("daemon exits")
            .unwrap();
        assert_eq!(tracker.state(), TrackingState::Idle);
    }

    #[tokio::test]
    async fn test_status_after_shutdown_is_none() {
        let (handle, join, _, token) = spawn_with(Duration::ZERO, Duration::from_secs(60));
        token.cancel();
        join.await.unwrap();
        assert!(handle.status().await.is_none());
        assert!(!handle.start());
    }
}
