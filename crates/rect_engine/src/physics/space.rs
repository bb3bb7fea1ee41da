//! Continuous collision simulation over a spacetime index
//!
//! A [`Space`] owns a set of domain objects, each exposing a
//! [`PhysicsObject`], and advances them through time with swept collision
//! detection: every update interval each body's trajectory bound is
//! indexed in a 3-D (two spatial axes plus time, in microseconds) search
//! tree, candidate pairs are solved for their exact collision instant,
//! and collisions are resolved in causal order with elastic impulses and
//! cascading re-queries.
//!
//! The participating object types form a closed set fixed at
//! construction: callers define one enum over their concrete types and
//! implement [`SpaceObject`] for it, dispatching collision pairs with an
//! exhaustive match.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use slotmap::{new_key_type, SlotMap};

use crate::config::{ConfigError, SpaceConfig, MAX_TREE_DEPTH};
use crate::foundation::math::{Point, Rect, Vector};
use crate::foundation::time::seconds_to_micros;
use crate::physics::collision_time::collision_time;
use crate::physics::object::PhysicsObject;
use crate::spatial::rect_search_tree::{EntryKey, RectSearchTree};

new_key_type! {
    /// Generation-checked handle to an object added to a [`Space`].
    pub struct MotionKey;
}

/// What a collision handler wants done with the participants.
///
/// Handlers cannot call back into the [`Space`] (it is mutably borrowed
/// while they run), so structural requests are returned instead and
/// applied under the engine's deferred-removal protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResponse {
    /// Remove the handler's own object once resolution allows it.
    pub remove_self: bool,
    /// Remove the other participant once resolution allows it.
    pub remove_other: bool,
}

impl CollisionResponse {
    /// Keep both participants.
    pub const NONE: Self = Self {
        remove_self: false,
        remove_other: false,
    };

    /// Remove the handler's own object.
    pub const REMOVE_SELF: Self = Self {
        remove_self: true,
        remove_other: false,
    };
}

/// Contract for objects simulated by a [`Space`].
///
/// Implementors are usually an enum over the closed set of concrete
/// types participating in the simulation; `on_collide_with` then
/// dispatches on the pair of variants with an exhaustive match.
pub trait SpaceObject {
    /// The body's motion state.
    fn physics(&self) -> &PhysicsObject<2>;

    /// Mutable access to the body's motion state.
    fn physics_mut(&mut self) -> &mut PhysicsObject<2>;

    /// Notification that this object collides with `other` at the
    /// instant both bodies currently represent.
    ///
    /// `other_velocity` is the other body's pre-collision velocity
    /// (both sides of a pair see symmetric, order-independent inputs)
    /// and `axis` is the colliding axis. The engine applies the elastic
    /// impulse itself after both handlers ran; handlers add
    /// domain-specific behavior on top. Default: do nothing.
    fn on_collide_with(
        &mut self,
        other: &Self,
        other_velocity: Vector<f64, 2>,
        axis: usize,
    ) -> CollisionResponse {
        let _ = (other, other_velocity, axis);
        CollisionResponse::NONE
    }
}

struct Motion<O> {
    object: O,
    // Spacetime bound of the trajectory over the pending interval.
    enclosing_rect: Rect<i64, 3>,
    tree_key: EntryKey,
    marked_for_removal: bool,
}

// Speculative candidate: either side's state may change before the event
// is popped, so it is re-validated then.
struct CollisionEvent {
    a: MotionKey,
    b: MotionKey,
    time: f64,
    axis: usize,
}

impl PartialEq for CollisionEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time.total_cmp(&other.time).is_eq()
    }
}

impl Eq for CollisionEvent {}

impl PartialOrd for CollisionEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollisionEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time.total_cmp(&other.time)
    }
}

type EventQueue = BinaryHeap<Reverse<CollisionEvent>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle,
    Resolving,
}

// Whether the pair is approaching along `axis`, judged from rects
// projected to a common instant. A contact that is not closing is a
// leftover from an already-resolved collision.
fn is_closing(
    rect_a: &Rect<f64, 2>,
    rect_b: &Rect<f64, 2>,
    relative_velocity: f64,
    axis: usize,
) -> bool {
    let center_a = rect_a.pos[axis] + rect_a.size[axis] / 2.0;
    let center_b = rect_b.pos[axis] + rect_b.size[axis] / 2.0;
    if center_a < center_b {
        relative_velocity > 0.0
    } else if center_a > center_b {
        relative_velocity < 0.0
    } else {
        relative_velocity != 0.0
    }
}

/// Continuous collision engine over a fixed 2-D region.
///
/// Single-threaded and non-reentrant; one instance exclusively owns its
/// tree and motion list. `advance_time` runs to completion, bounded only
/// by the number of generated collision events.
pub struct Space<O: SpaceObject> {
    motions: SlotMap<MotionKey, Motion<O>>,
    tree: RectSearchTree<3, MotionKey>,
    state: EngineState,
    pending_removals: Vec<MotionKey>,
    // Absolute end of the last completed interval, in seconds.
    time_seconds: f64,
}

impl<O: SpaceObject> Space<O> {
    /// Create a space over `rect` with default tuning.
    pub fn new(rect: Rect<i64, 2>) -> Self {
        Self::build(rect, &SpaceConfig::default())
    }

    /// Create a space over `rect` with explicit tuning.
    pub fn with_config(rect: Rect<i64, 2>, config: &SpaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(rect, config))
    }

    fn build(rect: Rect<i64, 2>, config: &SpaceConfig) -> Self {
        let depth = config.tree_depth.clamp(1, MAX_TREE_DEPTH);
        let span = config.time_axis_span_us.max(1);
        let bound = Rect::new(
            Point::<i64, 3>::new(rect.pos[0], rect.pos[1], 0),
            Vector::<i64, 3>::new(rect.size[0], rect.size[1], span),
        );
        let tree = RectSearchTree::create(bound, depth).expect("depth is clamped to at least 1");
        Self {
            motions: SlotMap::with_key(),
            tree,
            state: EngineState::Idle,
            pending_removals: Vec::new(),
            time_seconds: 0.0,
        }
    }

    /// Absolute simulation time reached by the last
    /// [`advance_time`](Self::advance_time) call, in seconds.
    pub fn time_seconds(&self) -> f64 {
        self.time_seconds
    }

    /// Number of live objects, including those pending removal.
    pub fn len(&self) -> usize {
        self.motions.len()
    }

    /// Whether the space holds no objects.
    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    /// Add an object to the simulation.
    pub fn add(&mut self, object: O) -> MotionKey {
        let spatial = object.physics().grid_rect();
        let enclosing = Rect::new(
            Point::<i64, 3>::new(spatial.pos[0], spatial.pos[1], 0),
            Vector::<i64, 3>::new(spatial.size[0], spatial.size[1], 0),
        );
        let key = self.motions.insert(Motion {
            object,
            enclosing_rect: enclosing,
            tree_key: EntryKey::default(),
            marked_for_removal: false,
        });
        let tree_key = self.tree.insert(enclosing, key);
        self.motions[key].tree_key = tree_key;
        key
    }

    /// Remove an object, returning it when removal happens immediately.
    ///
    /// While collision resolution is in progress the removal is deferred:
    /// the object is flagged, excluded from further collisions and
    /// integration, and dropped when resolution completes (`None` is
    /// returned). Stale keys return `None`.
    pub fn remove(&mut self, key: MotionKey) -> Option<O> {
        match self.state {
            EngineState::Resolving => {
                if let Some(motion) = self.motions.get_mut(key) {
                    if !motion.marked_for_removal {
                        motion.marked_for_removal = true;
                        self.pending_removals.push(key);
                        log::debug!("removal deferred until resolution completes");
                    }
                }
                None
            }
            EngineState::Idle => self.remove_now(key),
        }
    }

    fn remove_now(&mut self, key: MotionKey) -> Option<O> {
        let motion = self.motions.remove(key)?;
        self.tree.remove(motion.tree_key);
        Some(motion.object)
    }

    /// Shared access to an object.
    pub fn get(&self, key: MotionKey) -> Option<&O> {
        self.motions.get(key).map(|motion| &motion.object)
    }

    /// Mutable access to an object.
    pub fn get_mut(&mut self, key: MotionKey) -> Option<&mut O> {
        self.motions.get_mut(key).map(|motion| &mut motion.object)
    }

    /// Iterate over every object, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (MotionKey, &O)> {
        self.motions.iter().map(|(key, motion)| (key, &motion.object))
    }

    /// Objects whose current trajectory bound overlaps the spatial query
    /// rect. Lazy and restartable: two calls without intervening
    /// mutation yield equivalent (not necessarily identically ordered)
    /// contents.
    pub fn near(&self, rect: Rect<i64, 2>) -> impl Iterator<Item = (MotionKey, &O)> + '_ {
        let bound = *self.tree.bound();
        let query = Rect::new(
            Point::<i64, 3>::new(rect.pos[0], rect.pos[1], bound.pos[2]),
            Vector::<i64, 3>::new(rect.size[0], rect.size[1], bound.size[2]),
        );
        self.tree.near(query).filter_map(move |(_, &key)| {
            self.motions.get(key).and_then(|motion| {
                motion
                    .enclosing_rect
                    .overlaps(&query)
                    .then_some((key, &motion.object))
            })
        })
    }

    // Recompute a motion's trajectory bound from its body's current
    // instant to the interval end and re-index it.
    fn update_enclosing(
        tree: &mut RectSearchTree<3, MotionKey>,
        motion: &mut Motion<O>,
        finish: f64,
    ) {
        let physics = motion.object.physics();
        let start = physics.time();
        let start_rect = physics.grid_rect();
        let finish_rect = physics.rect_after_time(finish - start).to_i64();
        let bounds = start_rect.union(&finish_rect);
        motion.enclosing_rect = Rect::new(
            Point::<i64, 3>::new(bounds.pos[0], bounds.pos[1], seconds_to_micros(start)),
            Vector::<i64, 3>::new(
                bounds.size[0],
                bounds.size[1],
                seconds_to_micros(finish - start).max(0),
            ),
        );
        tree.relocate(motion.tree_key, motion.enclosing_rect);
    }

    // Propose collision events for one motion against its tree
    // neighborhood. Self-pairs, flagged motions, pairs with disjoint
    // trajectory bounds, and instants beyond the interval are filtered
    // here; everything else is re-validated when popped.
    fn find_collisions(&self, queue: &mut EventQueue, key: MotionKey, finish: f64) {
        let Some(motion_a) = self.motions.get(key) else {
            return;
        };
        if motion_a.marked_for_removal {
            return;
        }
        for (_, &other_key) in self.tree.near(motion_a.enclosing_rect) {
            if other_key == key {
                continue;
            }
            let Some(motion_b) = self.motions.get(other_key) else {
                continue;
            };
            if motion_b.marked_for_removal {
                continue;
            }
            let bound_a = &motion_a.enclosing_rect;
            let bound_b = &motion_b.enclosing_rect;
            if !bound_a.overlaps(bound_b) && !bound_a.touches(bound_b) {
                continue;
            }
            if let Some((time, axis)) =
                collision_time(motion_a.object.physics(), motion_b.object.physics())
            {
                if time <= finish {
                    queue.push(Reverse(CollisionEvent {
                        a: key,
                        b: other_key,
                        time,
                        axis,
                    }));
                }
            }
        }
    }

    /// Advance the simulation to the absolute instant `new_time_seconds`,
    /// detecting and resolving every collision inside the interval in
    /// causal order.
    ///
    /// The interval is rebased internally: each body's timestamp is
    /// relative to the interval start, and the spacetime index spans
    /// `[0, interval length]` on its time axis.
    pub fn advance_time(&mut self, new_time_seconds: f64) {
        let finish = (new_time_seconds - self.time_seconds).max(0.0);
        self.time_seconds = new_time_seconds;
        self.state = EngineState::Resolving;

        // Rebase every live motion to the interval start and index its
        // trajectory bound across the whole interval.
        let keys: Vec<MotionKey> = self.motions.keys().collect();
        for key in &keys {
            let Some(motion) = self.motions.get_mut(*key) else {
                continue;
            };
            if motion.marked_for_removal {
                continue;
            }
            motion.object.physics_mut().set_time(0.0);
            Self::update_enclosing(&mut self.tree, motion, finish);
        }

        // Seed the queue with first collisions, earliest first.
        let mut queue = EventQueue::new();
        for key in &keys {
            self.find_collisions(&mut queue, *key, finish);
        }

        // Resolve in causal order. Each resolution can invalidate queued
        // events and create new ones; stale entries are discarded when
        // popped.
        while let Some(Reverse(event)) = queue.pop() {
            let Some([motion_a, motion_b]) = self.motions.get_disjoint_mut([event.a, event.b])
            else {
                continue;
            };
            if motion_a.marked_for_removal || motion_b.marked_for_removal {
                continue;
            }

            let physics_a = motion_a.object.physics();
            let physics_b = motion_b.object.physics();
            // An earlier collision may have advanced a body past this
            // event already.
            if event.time < physics_a.time() || event.time < physics_b.time() {
                continue;
            }
            let projected_a = physics_a.rect_at_time(event.time);
            let projected_b = physics_b.rect_at_time(event.time);
            if !projected_a.to_i64().touches(&projected_b.to_i64()) {
                log::trace!("discarding stale collision event at t={}", event.time);
                continue;
            }
            let relative = physics_a.velocity[event.axis] - physics_b.velocity[event.axis];
            if !is_closing(&projected_a, &projected_b, relative, event.axis) {
                log::trace!("discarding separating contact at t={}", event.time);
                continue;
            }

            // Advance full state, not just the colliding axis, to the
            // collision instant.
            motion_a.object.physics_mut().update_to_time(event.time);
            motion_b.object.physics_mut().update_to_time(event.time);

            // Pre-collision snapshots keep both sides order independent.
            let (mass_a, velocity_a) = {
                let physics = motion_a.object.physics();
                (physics.mass, physics.velocity)
            };
            let (mass_b, velocity_b) = {
                let physics = motion_b.object.physics();
                (physics.mass, physics.velocity)
            };

            let response_a =
                motion_a
                    .object
                    .on_collide_with(&motion_b.object, velocity_b, event.axis);
            let response_b =
                motion_b
                    .object
                    .on_collide_with(&motion_a.object, velocity_a, event.axis);

            motion_a
                .object
                .physics_mut()
                .apply_elastic_1d(mass_b, velocity_b, event.axis);
            motion_b
                .object
                .physics_mut()
                .apply_elastic_1d(mass_a, velocity_a, event.axis);

            log::debug!(
                "resolved collision on axis {} at t={}",
                event.axis,
                event.time
            );

            Self::update_enclosing(&mut self.tree, motion_a, finish);
            Self::update_enclosing(&mut self.tree, motion_b, finish);

            if response_a.remove_self || response_b.remove_other {
                let _ = self.remove(event.a);
            }
            if response_a.remove_other || response_b.remove_self {
                let _ = self.remove(event.b);
            }

            // The impulse changed both trajectories; look for follow-on
            // collisions in the remainder of the interval.
            self.find_collisions(&mut queue, event.a, finish);
            self.find_collisions(&mut queue, event.b, finish);
        }

        // Apply removals deferred during resolution.
        for key in std::mem::take(&mut self.pending_removals) {
            let _ = self.remove_now(key);
        }

        // Integrate every remaining body to the interval end.
        let keys: Vec<MotionKey> = self.motions.keys().collect();
        for key in keys {
            if let Some(motion) = self.motions.get_mut(key) {
                motion.object.physics_mut().update_to_time(finish);
            }
        }

        self.state = EngineState::Idle;
    }
}
