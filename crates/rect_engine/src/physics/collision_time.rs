//! Analytic swept collision-time solver
//!
//! Given two bodies whose state may be stamped at different instants,
//! solve for the earliest instant their rects come into contact,
//! assuming constant velocity. Pending accumulated forces are ignored,
//! matching [`PhysicsObject::rect_after_time`].

use crate::physics::object::PhysicsObject;

// Solve one axis: the absolute instant at which the pair's closing edges
// coincide, or None if they never do or the algebraic root is spurious.
fn collision_time_1d<const N: usize>(
    a: &PhysicsObject<N>,
    b: &PhysicsObject<N>,
    axis: usize,
) -> Option<f64> {
    let vel_a = a.velocity[axis];
    let vel_b = b.velocity[axis];
    // Equal velocities never close the gap.
    if vel_a == vel_b {
        return None;
    }

    let rect_a = a.grid_rect();
    let rect_b = b.grid_rect();

    // Candidate edge pairs: a's far edge against b's near edge, and the
    // reverse. The pair with the smaller initial gap is the one that can
    // actually collide.
    let mut pos_a = rect_a.pos[axis] + rect_a.size[axis];
    let mut pos_b = rect_b.pos[axis];
    let near_a = rect_a.pos[axis];
    let far_b = rect_b.pos[axis] + rect_b.size[axis];
    if (near_a - far_b).abs() < (pos_a - pos_b).abs() {
        pos_a = near_a;
        pos_b = far_b;
    }

    // Each body's edge position is valid as of its own timestamp; solve
    // for the common absolute instant accounting for the offset.
    let t0_diff = a.time() - b.time();
    let pos_final = (vel_b * (vel_a * t0_diff - pos_a as f64) + vel_a * pos_b as f64)
        / (vel_a - vel_b);

    let time_final = if vel_a == 0.0 {
        (pos_final - pos_b as f64) / vel_b + b.time()
    } else {
        (pos_final - pos_a as f64) / vel_a + a.time()
    };

    // Confirm the rects actually meet at the solved instant; a one-sided
    // zero velocity or an offset on another axis yields spurious roots.
    let next_a = a.rect_at_time(time_final).to_i64();
    let next_b = b.rect_at_time(time_final).to_i64();
    if !next_a.touches(&next_b) {
        return None;
    }

    Some(time_final)
}

/// The earliest instant at which `a` and `b` collide, with the colliding
/// axis, or `None` if they do not collide.
///
/// The reported instant is never earlier than either body's own
/// timestamp; candidates in the past are discarded.
pub fn collision_time<const N: usize>(
    a: &PhysicsObject<N>,
    b: &PhysicsObject<N>,
) -> Option<(f64, usize)> {
    let mut result: Option<(f64, usize)> = None;
    for axis in 0..N {
        let Some(time) = collision_time_1d(a, b, axis) else {
            continue;
        };
        if time < a.time() || time < b.time() {
            continue;
        }
        if result.map_or(true, |(best, _)| time < best) {
            result = Some((time, axis));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Rect, Vector};
    use approx::assert_relative_eq;

    fn body(x: f64, y: f64, vx: f64, vy: f64) -> PhysicsObject<2> {
        let mut object = PhysicsObject::new(Rect::from_xywh(x, y, 10.0, 10.0), 1.0);
        object.velocity = Vector::<f64, 2>::new(vx, vy);
        object
    }

    #[test]
    fn test_head_on_instant() {
        let a = body(100.0, 100.0, 1.0, 0.0);
        let b = body(120.0, 100.0, 0.0, 0.0);

        let (time, axis) = collision_time(&a, &b).unwrap();
        assert_relative_eq!(time, 10.0);
        assert_eq!(axis, 0);

        // Symmetric in argument order.
        let (time, axis) = collision_time(&b, &a).unwrap();
        assert_relative_eq!(time, 10.0);
        assert_eq!(axis, 0);
    }

    #[test]
    fn test_equal_velocities_never_collide() {
        let a = body(100.0, 100.0, 2.0, 0.0);
        let b = body(120.0, 100.0, 2.0, 0.0);
        assert_eq!(collision_time(&a, &b), None);
    }

    #[test]
    fn test_receding_pair_never_collides() {
        let a = body(100.0, 100.0, -1.0, 0.0);
        let b = body(120.0, 100.0, 0.0, 0.0);
        assert_eq!(collision_time(&a, &b), None);
    }

    #[test]
    fn test_spurious_root_rejected_by_projection() {
        // The x axis algebra has a root at t=10, but the bodies are far
        // apart in y, so the projected rects never touch.
        let a = body(100.0, 100.0, 1.0, 0.0);
        let b = body(120.0, 300.0, 0.0, 0.0);
        assert_eq!(collision_time(&a, &b), None);
    }

    #[test]
    fn test_timestamp_offsets_are_honored() {
        let mut a = body(100.0, 100.0, 1.0, 0.0);
        let b = body(120.0, 100.0, 0.0, 0.0);
        // Advance a to t=5 (x=105); its far edge, 115 as of t=5, still
        // reaches b's near edge at the absolute instant t=10.
        a.update_to_time(5.0);

        let (time, axis) = collision_time(&a, &b).unwrap();
        assert_relative_eq!(time, 10.0);
        assert_eq!(axis, 0);
    }

    #[test]
    fn test_earliest_axis_wins() {
        // Closing diagonally; contact on y happens before x.
        let a = body(100.0, 100.0, 1.0, 2.0);
        let b = body(105.0, 120.0, 0.0, 0.0);

        let (time, axis) = collision_time(&a, &b).unwrap();
        assert_relative_eq!(time, 5.0);
        assert_eq!(axis, 1);
    }
}
