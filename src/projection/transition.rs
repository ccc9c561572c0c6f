use crate::geo::{lon_delta, wrap_longitude};

/// Animated rotation change as an explicit stepped state machine.
///
/// Driven by discrete tick calls from the outer animation clock; every
/// intermediate step is expected to go through `Projection::set_rotation` so
/// the clip polygon is rebuilt mid-flight, not just at the final value.
/// Starting a new transition replaces any in-flight one outright; a display
/// has at most one active transition.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Transition {
    Idle,
    Transitioning {
        start: (f64, f64),
        target: (f64, f64),
        /// Clock timestamp in seconds when the transition began.
        started_at: f64,
        /// Total duration in seconds.
        duration: f64,
    },
}

impl Transition {
    /// Begin a transition from `from` to `to`, superseding any active one.
    pub fn start(&mut self, from: (f64, f64), to: (f64, f64), now: f64, duration: f64) {
        *self = Transition::Transitioning {
            start: from,
            target: to,
            started_at: now,
            duration: duration.max(1e-6),
        };
    }

    /// Cancel without reaching the target.
    pub fn cancel(&mut self) {
        *self = Transition::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Transition::Transitioning { .. })
    }

    /// Advance to clock time `now` (seconds). Returns the rotation for this
    /// tick, or `None` when idle. The final tick returns exactly the target
    /// and drops back to `Idle`. Longitude interpolates along the short way
    /// around, including across the antimeridian.
    pub fn step(&mut self, now: f64) -> Option<(f64, f64)> {
        let (start, target, started_at, duration) = match *self {
            Transition::Idle => return None,
            Transition::Transitioning {
                start,
                target,
                started_at,
                duration,
            } => (start, target, started_at, duration),
        };

        let t = ((now - started_at) / duration).clamp(0.0, 1.0);
        if t >= 1.0 {
            *self = Transition::Idle;
            return Some(target);
        }

        // Smoothstep easing
        let e = t * t * (3.0 - 2.0 * t);
        let lon = wrap_longitude(start.0 + lon_delta(start.0, target.0) * e);
        let lat = start.1 + (target.1 - start.1) * e;
        Some((lon, lat))
    }
}
