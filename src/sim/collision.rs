//! Collision detection and response for the ball
//!
//! Two independent checks run against the same pre-tick state:
//! - obstacle test: the first hand rectangle (detector order) touching the
//!   ball redirects it radially away from that rectangle's center
//! - boundary test: an axis moving into a frame edge it has reached bounces
//!
//! The results are then combined. The redirect (if any) replaces the
//! velocity, and every bouncing axis is forced to point back into the
//! frame. Without an obstacle hit this is a plain sign flip; with one it
//! only changes signs, so the speed stays constant either way. Cosmetic
//! effects key off the boundary result alone.

use glam::Vec2;

use super::obstacle::ObstacleRect;
use super::state::{FrameSettings, MovingCircle};

/// Direction used when the ball center sits exactly on an obstacle center
/// and the ball has no velocity to fall back on
pub const FALLBACK_DIRECTION: Vec2 = Vec2::NEG_Y;

/// Which axes bounced off a frame edge this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryBounce {
    pub x: bool,
    pub y: bool,
}

impl BoundaryBounce {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Result of resolving one tick's collisions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Index of the obstacle that redirected the ball
    pub hit: Option<usize>,
    /// Edge bounces (drives color and tone)
    pub bounce: BoundaryBounce,
    /// Velocity to integrate with
    pub vel: Vec2,
}

impl CollisionResult {
    pub fn collided(&self) -> bool {
        self.hit.is_some() || self.bounce.any()
    }
}

/// Check whether a circle touches an axis-aligned rectangle
///
/// Uses the closest point on the rectangle; the per-axis checks reject
/// far-away rectangles before the squared-distance test.
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &ObstacleRect) -> bool {
    let delta = center - rect.closest_point(center);
    delta.x.abs() <= radius && delta.y.abs() <= radius && delta.length_squared() <= radius * radius
}

/// Index of the first obstacle the ball touches
pub fn first_hit(ball: &MovingCircle, obstacles: &[ObstacleRect]) -> Option<usize> {
    obstacles
        .iter()
        .position(|rect| circle_rect_overlap(ball.pos, ball.radius, rect))
}

/// New velocity pointing from the rectangle center through the ball center
///
/// When both centers coincide the previous heading is kept, or
/// [`FALLBACK_DIRECTION`] if the ball was at rest.
pub fn radial_redirect(ball: &MovingCircle, rect: &ObstacleRect) -> Vec2 {
    let dir = (ball.pos - rect.center())
        .try_normalize()
        .or_else(|| {
            log::debug!("Ball centered on obstacle at {:?}, keeping heading", ball.pos);
            ball.vel.try_normalize()
        })
        .unwrap_or(FALLBACK_DIRECTION);
    dir * ball.speed
}

/// Edge bounces for the current position and velocity
///
/// An axis bounces only while moving toward an edge it has reached.
pub fn boundary_bounce(ball: &MovingCircle, frame: &FrameSettings) -> BoundaryBounce {
    let lo = ball.min_pos();
    let hi = ball.max_pos(frame);
    BoundaryBounce {
        x: (ball.vel.x < 0.0 && ball.pos.x <= lo.x) || (ball.vel.x > 0.0 && ball.pos.x >= hi.x),
        y: (ball.vel.y < 0.0 && ball.pos.y <= lo.y) || (ball.vel.y > 0.0 && ball.pos.y >= hi.y),
    }
}

/// Resolve obstacle and boundary collisions for one tick
pub fn resolve(
    ball: &MovingCircle,
    obstacles: &[ObstacleRect],
    frame: &FrameSettings,
) -> CollisionResult {
    let hit = first_hit(ball, obstacles);
    let bounce = boundary_bounce(ball, frame);

    let mut vel = match hit {
        Some(i) => radial_redirect(ball, &obstacles[i]),
        None => ball.vel,
    };

    // Point bouncing axes back inside; the pre-tick sign tells which edge
    if bounce.x {
        vel.x = if ball.vel.x < 0.0 { vel.x.abs() } else { -vel.x.abs() };
    }
    if bounce.y {
        vel.y = if ball.vel.y < 0.0 { vel.y.abs() } else { -vel.y.abs() };
    }

    CollisionResult { hit, bounce, vel }
}
