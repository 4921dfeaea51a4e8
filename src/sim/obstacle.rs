//! Hand landmarks to obstacle rectangles
//!
//! Each detected hand becomes the axis-aligned bounding box of its
//! landmarks, scaled from normalized [0,1] coordinates into frame pixels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::FrameSettings;
use crate::error::{Error, Result};

/// One detected hand: normalized landmark points in detector order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub points: Vec<Vec2>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Build from interleaved `[x0, y0, x1, y1, ...]` coordinates
    ///
    /// A trailing odd coordinate is dropped.
    pub fn from_flat(coords: &[f32]) -> Self {
        Self {
            points: coords
                .chunks_exact(2)
                .map(|xy| Vec2::new(xy[0], xy[1]))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Min and max corners over all points, or None when empty
    pub fn extents(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

/// Axis-aligned obstacle in frame pixels (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObstacleRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ObstacleRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Closest point of the rectangle to `p` (p itself when inside)
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }
}

/// Convert one hand into its pixel-space bounding box
pub fn bounding_rect(hand: &LandmarkSet, frame: &FrameSettings) -> Result<ObstacleRect> {
    let (lo, hi) = hand
        .extents()
        .ok_or_else(|| Error::InvalidInput("landmark set has no points".into()))?;
    let scale = frame.size();
    let lo = lo * scale;
    let hi = hi * scale;
    Ok(ObstacleRect::new(lo.x, lo.y, hi.x - lo.x, hi.y - lo.y))
}

/// Convert every detected hand, preserving detector order
///
/// Fails as a whole if any hand is empty so a malformed result never
/// replaces a good obstacle set.
pub fn extract(hands: &[LandmarkSet], frame: &FrameSettings) -> Result<Vec<ObstacleRect>> {
    hands.iter().map(|hand| bounding_rect(hand, frame)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame() -> FrameSettings {
        FrameSettings::new(1280, 720).unwrap()
    }

    #[test]
    fn test_extract_scales_extents() {
        let hand = LandmarkSet::new(vec![
            Vec2::new(0.5, 0.25),
            Vec2::new(0.25, 0.5),
            Vec2::new(0.75, 0.75),
        ]);
        let rects = extract(&[hand], &frame()).unwrap();
        assert_eq!(rects, vec![ObstacleRect::new(320.0, 180.0, 640.0, 360.0)]);
    }

    #[test]
    fn test_extract_empty_input() {
        assert!(extract(&[], &frame()).unwrap().is_empty());
    }

    #[test]
    fn test_extract_rejects_empty_hand() {
        let good = LandmarkSet::new(vec![Vec2::new(0.1, 0.1)]);
        let result = extract(&[good, LandmarkSet::default()], &frame());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_extract_keeps_detector_order() {
        let left = LandmarkSet::new(vec![Vec2::new(0.1, 0.1), Vec2::new(0.2, 0.2)]);
        let right = LandmarkSet::new(vec![Vec2::new(0.8, 0.1), Vec2::new(0.9, 0.2)]);
        let rects = extract(&[right, left], &frame()).unwrap();
        assert!(rects[0].x > rects[1].x);
    }

    #[test]
    fn test_from_flat() {
        let hand = LandmarkSet::from_flat(&[0.1, 0.2, 0.3, 0.4, 0.9]);
        assert_eq!(hand.points, vec![Vec2::new(0.1, 0.2), Vec2::new(0.3, 0.4)]);
    }

    #[test]
    fn test_closest_point() {
        let rect = ObstacleRect::new(0.0, 90.0, 20.0, 20.0);
        assert_eq!(rect.closest_point(Vec2::new(100.0, 100.0)), Vec2::new(20.0, 100.0));
        assert_eq!(rect.closest_point(Vec2::new(5.0, 95.0)), Vec2::new(5.0, 95.0));
        assert_eq!(rect.center(), Vec2::new(10.0, 100.0));
    }

    proptest! {
        #[test]
        fn prop_bounds_match_scaled_min_max(
            coords in prop::collection::vec((0.0f32..=1.0, 0.0f32..=1.0), 1..30)
        ) {
            let frame = frame();
            let hand = LandmarkSet::new(coords.iter().map(|&(x, y)| Vec2::new(x, y)).collect());
            let rect = bounding_rect(&hand, &frame).unwrap();

            let min_x = coords.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
            let max_x = coords.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
            let min_y = coords.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
            let max_y = coords.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

            let tol = 1e-3;
            prop_assert!((rect.min().x - min_x * 1280.0).abs() < tol);
            prop_assert!((rect.min().y - min_y * 720.0).abs() < tol);
            prop_assert!((rect.max().x - max_x * 1280.0).abs() < tol);
            prop_assert!((rect.max().y - max_y * 720.0).abs() < tol);
        }
    }
}
