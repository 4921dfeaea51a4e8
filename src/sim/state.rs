//! World and ball state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pixel dimensions of the active video frame, fixed for the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSettings {
    pub width: u32,
    pub height: u32,
}

impl FrameSettings {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Setup(format!("invalid frame size {width}x{height}")));
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }
}

/// The ball
///
/// Position and radius are in pixels, velocity in pixels per millisecond.
/// Velocity is either zero (before the first hit) or has magnitude `speed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingCircle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Constant speed applied on every obstacle redirect
    pub speed: f32,
    /// Timestamp (ms) of the last integration step
    pub last_update: f64,
}

impl MovingCircle {
    /// Create a resting ball at the frame center
    ///
    /// Radius and speed scale with the frame diagonal.
    pub fn centered(
        frame: &FrameSettings,
        radius_divisor: f32,
        speed_divisor: f32,
        now: f64,
    ) -> Result<Self> {
        let diagonal = frame.diagonal();
        let radius = diagonal / radius_divisor;
        let speed = diagonal / speed_divisor;
        if !(radius > 0.0) || !(speed > 0.0) {
            return Err(Error::Setup(format!(
                "degenerate ball (radius {radius}, speed {speed})"
            )));
        }
        // Ball must fit inside the frame or the clamp range inverts
        if 2.0 * radius > frame.width.min(frame.height) as f32 {
            return Err(Error::Setup(format!(
                "ball radius {radius} does not fit a {}x{} frame",
                frame.width, frame.height
            )));
        }
        Ok(Self {
            pos: frame.center(),
            vel: Vec2::ZERO,
            radius,
            speed,
            last_update: now,
        })
    }

    /// Lowest legal center position
    #[inline]
    pub fn min_pos(&self) -> Vec2 {
        Vec2::splat(self.radius)
    }

    /// Highest legal center position
    #[inline]
    pub fn max_pos(&self, frame: &FrameSettings) -> Vec2 {
        frame.size() - Vec2::splat(self.radius)
    }

    /// Clamp the center into the frame
    pub fn clamp_to(&mut self, frame: &FrameSettings) {
        self.pos = self.pos.clamp(self.min_pos(), self.max_pos(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_zero() {
        assert!(matches!(FrameSettings::new(0, 720), Err(Error::Setup(_))));
        assert!(FrameSettings::new(1, 1).is_ok());
    }

    #[test]
    fn test_ball_starts_centered_at_rest() {
        let frame = FrameSettings::new(1280, 720).unwrap();
        let ball = MovingCircle::centered(&frame, 40.0, 2000.0, 5.0).unwrap();
        let diagonal = (1280.0f32 * 1280.0 + 720.0 * 720.0).sqrt();

        assert_eq!(ball.pos, Vec2::new(640.0, 360.0));
        assert_eq!(ball.vel, Vec2::ZERO);
        assert!((ball.radius - diagonal / 40.0).abs() < 1e-4);
        assert!((ball.speed - diagonal / 2000.0).abs() < 1e-6);
        assert_eq!(ball.last_update, 5.0);
    }

    #[test]
    fn test_ball_must_fit() {
        let frame = FrameSettings::new(100, 4).unwrap();
        assert!(MovingCircle::centered(&frame, 2.0, 2000.0, 0.0).is_err());
    }

    #[test]
    fn test_clamp_to_frame() {
        let frame = FrameSettings::new(200, 100).unwrap();
        let mut ball = MovingCircle::centered(&frame, 22.36, 2000.0, 0.0).unwrap();
        ball.pos = Vec2::new(-50.0, 500.0);
        ball.clamp_to(&frame);
        assert!((ball.pos.x - ball.radius).abs() < 1e-5);
        assert!((ball.pos.y - (100.0 - ball.radius)).abs() < 1e-5);
    }
}
