//! Drawing surface abstraction
//!
//! The loop only ever needs four primitives, so the surface is a small
//! trait: the browser implements it on a 2D canvas context, tests and the
//! native demo record the calls instead.

pub mod color;
#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use color::{Color, Palette};

use glam::Vec2;

use crate::sim::ObstacleRect;

/// Output side of a render tick
pub trait Surface {
    /// Clear a rectangle back to transparent
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    /// Outline a rectangle (obstacles)
    fn stroke_rect(&mut self, rect: &ObstacleRect);
    /// Set the color used by subsequent fills
    fn set_fill_color(&mut self, color: Color);
    /// Fill a disc with the current fill color (the ball)
    fn fill_circle(&mut self, center: Vec2, radius: f32);
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear { width: f32, height: f32 },
    StrokeRect(ObstacleRect),
    FillColor(Color),
    FillCircle { center: Vec2, radius: f32 },
}

/// Surface that remembers the frame being drawn
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Calls since the most recent clear
    pub calls: Vec<DrawCall>,
    frames: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls of the last (or current) frame, starting at its clear
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }
}

impl Surface for RecordingSurface {
    // A clear starts a new frame; earlier calls are dropped
    fn clear_rect(&mut self, _x: f32, _y: f32, width: f32, height: f32) {
        self.frames += 1;
        self.calls.clear();
        self.calls.push(DrawCall::Clear { width, height });
    }

    fn stroke_rect(&mut self, rect: &ObstacleRect) {
        self.calls.push(DrawCall::StrokeRect(*rect));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.calls.push(DrawCall::FillColor(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.calls.push(DrawCall::FillCircle { center, radius });
    }
}
