//! Eased transition between two fixes.
//!
//! An [`Animation`] is a pure function of wall-clock time: callers sample it
//! on every frame and drop it once it reports completion. Starting a new
//! animation simply replaces the old one, continuing from wherever the
//! displayed position currently is.

use crate::position::Position;
use crate::projection::interpolate_great_circle;

/// Cubic ease-in-out over `t` in [0, 1].
///
/// `4t³` for the first half, `1 - (-2t + 2)³ / 2` for the second.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Interpolate between two positions along the great circle.
///
/// Altitude and velocity are blended linearly when both ends carry them;
/// otherwise whichever value is present is kept. Everything else (timestamp,
/// source, cache metadata) comes from `to`, the fix being approached.
pub fn interpolate_positions(from: &Position, to: &Position, t: f64) -> Position {
    let point = interpolate_great_circle(from.point(), to.point(), t);

    let mut position = to.clone();
    position.latitude = point.latitude;
    position.longitude = point.longitude;
    position.altitude = lerp_optional(from.altitude, to.altitude, t);
    position.velocity = lerp_optional(from.velocity, to.velocity, t);
    position
}

fn lerp_optional(a: Option<f64>, b: Option<f64>, t: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        (a, b) => b.or(a),
    }
}

/// One running transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    from: Position,
    to: Position,
    started_at_ms: u64,
    duration_ms: u64,
}

/// Result of sampling an [`Animation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub position: Position,
    /// Raw (un-eased) progress in [0, 1].
    pub progress: f64,
    pub finished: bool,
}

impl Animation {
    pub fn new(from: Position, to: Position, started_at_ms: u64, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            started_at_ms,
            duration_ms,
        }
    }

    /// Raw progress at `now_ms`.
    pub fn progress(&self, now_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        (elapsed as f64 / self.duration_ms as f64).min(1.0)
    }

    /// Position to display at `now_ms`.
    ///
    /// The final frame is exactly the target, not an interpolated
    /// approximation of it.
    pub fn sample(&self, now_ms: u64) -> Frame {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return Frame {
                position: self.to.clone(),
                progress: 1.0,
                finished: true,
            };
        }

        Frame {
            position: interpolate_positions(&self.from, &self.to, ease_in_out_cubic(progress)),
            progress,
            finished: false,
        }
    }

    pub fn target(&self) -> &Position {
        &self.to
    }
}
