//! Hand Bounce - a ball that bounces off your hands
//!
//! Core modules:
//! - `sim`: Ball physics (obstacle extraction, collisions, integration)
//! - `feed`: Detection feed and the latest-obstacles slot
//! - `coordinator`: Render loop and session lifecycle
//! - `renderer`: Drawing surface abstraction and colors
//! - `audio`: Bounce tone and duration sampling
//! - `settings`: Session configuration

pub mod audio;
pub mod coordinator;
pub mod error;
pub mod feed;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use coordinator::{LoopCoordinator, LoopState, Session, SessionHandle};
pub use error::{Error, Result};
pub use feed::{DetectionFeed, ObstacleSlot};
pub use settings::Settings;

/// Shared constants
pub mod consts {
    /// Landmarks per hand in the MediaPipe hand model
    pub const HAND_LANDMARKS: usize = 21;
    /// Ball radius = frame diagonal / this
    pub const DEFAULT_RADIUS_DIVISOR: f32 = 40.0;
    /// Ball speed (px/ms) = frame diagonal / this
    pub const DEFAULT_SPEED_DIVISOR: f32 = 2000.0;
}
