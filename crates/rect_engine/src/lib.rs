//! # Rect Engine
//!
//! Spatial indexing and continuous collision resolution for axis-aligned
//! rectangular bodies.
//!
//! The crate is built around three pieces:
//!
//! - **[`RectSearchTree`]**: a fixed-depth, statically partitioned binary
//!   search tree over an N-dimensional region, supporting insertion,
//!   relocation, removal, and overlap/touch queries.
//! - **[`PhysicsObject`]**: per-body linear motion state (position,
//!   velocity, accumulated force, mass) with Newtonian integration.
//! - **[`Space`]**: a time-augmented simulation layer that indexes each
//!   body's space-time trajectory bound, finds collision candidates via
//!   the tree, solves exact collision instants, and resolves collisions
//!   in causal order within one update interval.
//!
//! ## Quick Start
//!
//! ```rust
//! use rect_engine::prelude::*;
//!
//! struct Ball {
//!     physics: PhysicsObject<2>,
//! }
//!
//! impl SpaceObject for Ball {
//!     fn physics(&self) -> &PhysicsObject<2> {
//!         &self.physics
//!     }
//!
//!     fn physics_mut(&mut self) -> &mut PhysicsObject<2> {
//!         &mut self.physics
//!     }
//! }
//!
//! let mut space = Space::new(Rect::from_xywh(0, 0, 1000, 1000));
//! let mut ball = Ball {
//!     physics: PhysicsObject::new(Rect::from_xywh(100.0, 100.0, 10.0, 10.0), 1.0),
//! };
//! ball.physics.velocity = Vector::<f64, 2>::new(1.0, 2.0);
//! let key = space.add(ball);
//!
//! space.advance_time(10.0);
//! let ball = space.get(key).unwrap();
//! assert_eq!(ball.physics.rect.pos.x, 110.0);
//! assert_eq!(ball.physics.rect.pos.y, 120.0);
//! ```
//!
//! Rendering, audio, UI, and file I/O are out of scope; this crate is the
//! headless simulation core only.

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

pub use config::{ConfigError, SpaceConfig};
pub use physics::object::PhysicsObject;
pub use physics::space::{CollisionResponse, MotionKey, Space, SpaceObject};
pub use spatial::rect_search_tree::{EntryKey, NodeId, RectSearchTree, SpatialVisitor};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{ConfigError, SpaceConfig},
        foundation::math::{Point, Rect, Vector},
        physics::object::PhysicsObject,
        physics::space::{CollisionResponse, MotionKey, Space, SpaceObject},
        spatial::rect_search_tree::{EntryKey, RectSearchTree, SpatialVisitor},
    };
}
