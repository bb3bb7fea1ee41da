//! Physics module for swept collision detection and response
//!
//! Provides per-body linear motion state, an analytic collision-time
//! solver, and the [`Space`] simulation layer that resolves collisions
//! in causal order within each update interval.

pub mod collision_time;
pub mod object;
pub mod space;

pub use collision_time::collision_time;
pub use object::PhysicsObject;
pub use space::{CollisionResponse, MotionKey, Space, SpaceObject};
