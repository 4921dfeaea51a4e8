//! 2D canvas backend (WASM only)

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, Surface};
use crate::error::{Error, Result};
use crate::sim::{FrameSettings, ObstacleRect};

/// Surface backed by a `CanvasRenderingContext2d`
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Size the canvas to the video frame and grab its 2D context
    pub fn new(canvas: &HtmlCanvasElement, frame: &FrameSettings, outline: Color) -> Result<Self> {
        canvas.set_width(frame.width);
        canvas.set_height(frame.height);

        let ctx = canvas
            .get_context("2d")
            .map_err(|e| Error::Setup(format!("canvas context: {e:?}")))?
            .ok_or_else(|| Error::Setup("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Setup("not a 2d context".into()))?;

        ctx.set_stroke_style_str(&outline.to_css());
        ctx.set_line_width(2.0);

        Ok(Self { ctx })
    }
}

impl Surface for CanvasSurface {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ctx
            .clear_rect(x as f64, y as f64, width as f64, height as f64);
    }

    fn stroke_rect(&mut self, rect: &ObstacleRect) {
        self.ctx.stroke_rect(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        );
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.ctx.begin_path();
        if let Err(e) = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        ) {
            log::warn!("arc failed: {:?}", e);
            return;
        }
        self.ctx.fill();
    }
}
