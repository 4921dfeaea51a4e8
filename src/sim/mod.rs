//! Ball physics
//!
//! Everything that decides where the ball goes lives here. This module is
//! pure: no rendering, audio, detector or platform dependencies, and time
//! is always passed in explicitly.

pub mod collision;
pub mod obstacle;
pub mod state;
pub mod tick;

pub use collision::{
    BoundaryBounce, CollisionResult, FALLBACK_DIRECTION, boundary_bounce, circle_rect_overlap,
    first_hit, radial_redirect, resolve,
};
pub use obstacle::{LandmarkSet, ObstacleRect, bounding_rect, extract};
pub use state::{FrameSettings, MovingCircle};
pub use tick::{integrate, step_ball};
