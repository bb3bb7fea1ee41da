//! Headless demo: a row of touching balls struck from the left.
//!
//! Run with `RUST_LOG=debug cargo run --example billiards` to watch the
//! engine resolve the impact chain.

use rect_engine::foundation::logging;
use rect_engine::prelude::*;

struct Ball {
    name: &'static str,
    physics: PhysicsObject<2>,
}

impl Ball {
    fn new(name: &'static str, x: f64, vx: f64) -> Self {
        let mut physics = PhysicsObject::new(Rect::from_xywh(x, 100.0, 10.0, 10.0), 1.0);
        physics.velocity = Vector::<f64, 2>::new(vx, 0.0);
        Self { name, physics }
    }
}

impl SpaceObject for Ball {
    fn physics(&self) -> &PhysicsObject<2> {
        &self.physics
    }

    fn physics_mut(&mut self) -> &mut PhysicsObject<2> {
        &mut self.physics
    }

    fn on_collide_with(
        &mut self,
        _other: &Self,
        _other_velocity: Vector<f64, 2>,
        _axis: usize,
    ) -> CollisionResponse {
        println!("  {} was struck", self.name);
        CollisionResponse::NONE
    }
}

fn main() {
    logging::init();

    let mut space = Space::new(Rect::from_xywh(0, 0, 1000, 1000));
    space.add(Ball::new("cue", 60.0, 2.0));
    space.add(Ball::new("one", 100.0, 0.0));
    space.add(Ball::new("two", 110.0, 0.0));
    space.add(Ball::new("three", 120.0, 0.0));

    for step in 1..=4 {
        let t = f64::from(step) * 10.0;
        println!("t = {t}:");
        space.advance_time(t);
        let mut balls: Vec<&Ball> = space.iter().map(|(_, ball)| ball).collect();
        balls.sort_by(|a, b| a.physics.rect.pos.x.total_cmp(&b.physics.rect.pos.x));
        for ball in balls {
            println!(
                "  {:>5} x={:7.2} vx={:5.2}",
                ball.name, ball.physics.rect.pos.x, ball.physics.velocity.x
            );
        }
    }
}
