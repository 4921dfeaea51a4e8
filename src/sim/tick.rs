//! Variable timestep ball update
//!
//! Render ticks arrive at whatever rate the display refreshes, so the
//! ball is advanced by the wall-clock time since its last update.

use super::collision::{CollisionResult, resolve};
use super::obstacle::ObstacleRect;
use super::state::{FrameSettings, MovingCircle};

/// Advance the ball to `now` (ms) and clamp it into the frame
///
/// A timestamp older than the last update is treated as zero elapsed time.
pub fn integrate(ball: &mut MovingCircle, frame: &FrameSettings, now: f64) {
    let elapsed = (now - ball.last_update).max(0.0) as f32;
    ball.pos += ball.vel * elapsed;
    ball.clamp_to(frame);
    ball.last_update = now;
}

/// One physics step: resolve collisions against the obstacle snapshot,
/// adopt the resulting velocity, then integrate
pub fn step_ball(
    ball: &mut MovingCircle,
    obstacles: &[ObstacleRect],
    frame: &FrameSettings,
    now: f64,
) -> CollisionResult {
    let result = resolve(ball, obstacles, frame);
    if let Some(i) = result.hit {
        log::debug!("Ball redirected by hand {} at {:?}", i, ball.pos);
    }
    ball.vel = result.vel;
    integrate(ball, frame, now);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn frame() -> FrameSettings {
        FrameSettings::new(800, 600).unwrap()
    }

    fn ball() -> MovingCircle {
        MovingCircle::centered(&frame(), 50.0, 1000.0, 0.0).unwrap()
    }

    #[test]
    fn test_first_step_has_no_jump() {
        let mut b = ball();
        b.vel = Vec2::new(1.0, 0.0);
        let start = b.pos;
        integrate(&mut b, &frame(), 0.0);
        assert_eq!(b.pos, start);
    }

    #[test]
    fn test_integrate_moves_by_elapsed() {
        let mut b = ball();
        b.vel = Vec2::new(0.5, -0.25);
        integrate(&mut b, &frame(), 16.0);
        assert_eq!(b.pos, Vec2::new(408.0, 296.0));
        assert_eq!(b.last_update, 16.0);
    }

    #[test]
    fn test_integrate_ignores_time_going_backwards() {
        let mut b = ball();
        b.last_update = 100.0;
        b.vel = Vec2::new(1.0, 1.0);
        let start = b.pos;
        integrate(&mut b, &frame(), 50.0);
        assert_eq!(b.pos, start);
        assert_eq!(b.last_update, 50.0);
    }

    #[test]
    fn test_step_bounces_then_moves_inward() {
        let f = frame();
        let mut b = ball();
        b.pos = Vec2::new(b.radius, 300.0);
        b.vel = Vec2::new(-b.speed, 0.0);

        let result = step_ball(&mut b, &[], &f, 10.0);
        assert!(result.bounce.x);
        assert!(b.vel.x > 0.0);
        assert!(b.pos.x > b.radius);
    }

    #[test]
    fn test_resting_ball_stays_put_without_hands() {
        let f = frame();
        let mut b = ball();
        let start = b.pos;
        for t in 1..100 {
            let result = step_ball(&mut b, &[], &f, t as f64 * 16.7);
            assert!(!result.collided());
        }
        assert_eq!(b.pos, start);
    }

    #[test]
    fn test_no_hands_only_reflects() {
        let f = frame();
        let mut b = ball();
        b.vel = Vec2::new(0.6, 0.8) * b.speed;
        let mut bounces = 0;
        for t in 1..2000 {
            let before = b.vel;
            let result = step_ball(&mut b, &[], &f, t as f64 * 16.0);
            assert_eq!(result.hit, None);
            // Components only ever change sign
            assert_eq!(b.vel.abs(), before.abs());
            if result.bounce.any() {
                bounces += 1;
            }
        }
        assert!(bounces > 0);
    }

    proptest! {
        #[test]
        fn prop_integrate_is_clamped_linear_motion(
            x in 12.0f32..788.0, y in 12.0f32..588.0,
            vx in -2.0f32..2.0, vy in -2.0f32..2.0,
            t in 0.0f64..500.0,
        ) {
            let f = frame();
            let mut b = ball();
            b.pos = Vec2::new(x, y);
            b.vel = Vec2::new(vx, vy);
            integrate(&mut b, &f, t);

            let r = b.radius;
            let ex = (x + vx * t as f32).clamp(r, 800.0 - r);
            let ey = (y + vy * t as f32).clamp(r, 600.0 - r);
            prop_assert!((b.pos.x - ex).abs() < 1e-3);
            prop_assert!((b.pos.y - ey).abs() < 1e-3);
        }
    }
}
