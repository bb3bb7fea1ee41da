//! Time units and conversion helpers
//!
//! Simulation time is measured in seconds (`f64`). The spacetime search
//! tree indexes the time axis in whole microseconds.

use std::time::Duration;

/// Microseconds per second, as used by the spacetime index axis.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Step length substituted when a free-running update observes zero
/// elapsed wall time. See [`elapsed_seconds_or_default`].
pub const DEFAULT_STEP_SECS: f64 = 1.0;

/// Convert seconds to whole microseconds (truncating).
pub fn seconds_to_micros(seconds: f64) -> i64 {
    (seconds * MICROS_PER_SECOND) as i64
}

/// Convert whole microseconds to seconds.
pub fn micros_to_seconds(micros: i64) -> f64 {
    micros as f64 / MICROS_PER_SECOND
}

/// Elapsed wall time in seconds, substituting [`DEFAULT_STEP_SECS`] when
/// the clock has not advanced.
///
/// A zero-length interval integrates as exactly one second. This is a
/// long-standing quirk of the free-running update path; callers that need
/// exact stepping should drive [`PhysicsObject::update_to_time`] instead.
///
/// [`PhysicsObject::update_to_time`]: crate::physics::object::PhysicsObject::update_to_time
pub fn elapsed_seconds_or_default(elapsed: Duration) -> f64 {
    if elapsed.is_zero() {
        DEFAULT_STEP_SECS
    } else {
        elapsed.as_secs_f64()
    }
}
