//! Per-body linear motion state and Newtonian integration

use std::time::Instant;

use crate::foundation::math::{Rect, Vector};
use crate::foundation::time::elapsed_seconds_or_default;

/// Linear motion state for one rigid axis-aligned body.
///
/// Holds a floating-point rect, a mass, a velocity, and a pending force
/// accumulator. Forces applied with [`apply_force`](Self::apply_force)
/// take effect at the next update, not immediately.
///
/// Mass is expected to be positive; zero or negative masses are not
/// rejected and produce degenerate accelerations.
#[derive(Debug, Clone)]
pub struct PhysicsObject<const N: usize> {
    /// Current bounds of the body.
    pub rect: Rect<f64, N>,
    /// Mass in kilograms.
    pub mass: f64,
    /// Velocity in units per second.
    pub velocity: Vector<f64, N>,
    /// Forces accumulated since the last update.
    pub forces_sum: Vector<f64, N>,
    // The simulation instant this state represents, in seconds. Inside a
    // Space this is relative to the current update interval's start.
    time: f64,
    // Wall clock stamp for the free-running update path.
    last_update: Instant,
}

impl<const N: usize> PhysicsObject<N> {
    /// Create a body at rest.
    pub fn new(rect: Rect<f64, N>, mass: f64) -> Self {
        Self {
            rect,
            mass,
            velocity: Vector::zeros(),
            forces_sum: Vector::zeros(),
            time: 0.0,
            last_update: Instant::now(),
        }
    }

    /// The simulation instant this state represents, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Relabel the instant this state represents without integrating.
    pub(crate) fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// The body's bounds on the integer grid used by the search tree.
    pub fn grid_rect(&self) -> Rect<i64, N> {
        self.rect.to_i64()
    }

    /// Accumulate a force to be integrated at the next update. Has no
    /// effect on velocity or position until then.
    pub fn apply_force(&mut self, force: Vector<f64, N>) {
        self.forces_sum += force;
    }

    /// The bounds this body would have after coasting for `delta`
    /// seconds at its current velocity.
    ///
    /// Constant-velocity prediction only: pending accumulated force is
    /// ignored, even though [`update`](Self::update) will integrate it.
    /// Collision prediction therefore diverges from the subsequent
    /// integration step whenever a force is applied mid-interval.
    pub fn rect_after_time(&self, delta: f64) -> Rect<f64, N> {
        let mut rect = self.rect;
        rect.pos += self.velocity * delta;
        rect
    }

    /// The bounds this body would have at absolute instant `time`,
    /// extrapolated from its own timestamp at constant velocity.
    pub fn rect_at_time(&self, time: f64) -> Rect<f64, N> {
        self.rect_after_time(time - self.time)
    }

    // a = F / m; v += a dt; p += v dt; clear the accumulator.
    fn integrate(&mut self, delta: f64) {
        let acceleration = self.forces_sum / self.mass;
        self.forces_sum = Vector::zeros();
        self.velocity += acceleration * delta;
        self.rect.pos += self.velocity * delta;
        self.time += delta;
    }

    /// Free-running update: integrate by the wall time elapsed since the
    /// last call.
    ///
    /// If the clock has not advanced, the step is taken to be exactly one
    /// second (see
    /// [`elapsed_seconds_or_default`](crate::foundation::time::elapsed_seconds_or_default)).
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = elapsed_seconds_or_default(now - self.last_update);
        self.integrate(delta);
        self.last_update = now;
    }

    /// Integrate forward to the absolute instant `time`.
    pub fn update_to_time(&mut self, time: f64) {
        self.integrate(time - self.time);
        // Pin exactly; integrate accumulates rounding.
        self.time = time;
    }

    /// New velocity for one side of a 1-D perfectly elastic collision.
    fn elastic_velocity(mass: f64, v: f64, other_mass: f64, other_v: f64) -> f64 {
        ((mass - other_mass) * v + 2.0 * other_mass * other_v) / (mass + other_mass)
    }

    /// Apply this body's half of a perfectly elastic collision along one
    /// axis, given the other body's mass and pre-collision velocity.
    pub fn apply_elastic_1d(&mut self, other_mass: f64, other_velocity: Vector<f64, N>, axis: usize) {
        self.velocity[axis] = Self::elastic_velocity(
            self.mass,
            self.velocity[axis],
            other_mass,
            other_velocity[axis],
        );
    }

    /// Resolve a perfectly elastic, momentum-conserving collision along
    /// one axis, updating both bodies from pre-collision snapshots so
    /// the result is independent of argument order.
    pub fn elastic_collision_1d(a: &mut Self, b: &mut Self, axis: usize) {
        let (a_mass, a_velocity) = (a.mass, a.velocity);
        let (b_mass, b_velocity) = (b.mass, b.velocity);
        a.apply_elastic_1d(b_mass, b_velocity, axis);
        b.apply_elastic_1d(a_mass, a_velocity, axis);
    }

    /// Resolve a perfectly elastic collision independently on every
    /// axis.
    pub fn elastic_collision(a: &mut Self, b: &mut Self) {
        for axis in 0..N {
            Self::elastic_collision_1d(a, b, axis);
        }
    }
}
