//! Session settings
//!
//! Read once at startup. On the web they may be overridden through the
//! `hand_bounce_settings` LocalStorage key; nothing is ever written back.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_RADIUS_DIVISOR, DEFAULT_SPEED_DIVISOR};
use crate::error::{Error, Result};
use crate::renderer::Color;

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Camera ===
    /// Requested capture width (the camera may pick something else)
    pub camera_width: u32,
    /// Requested capture height
    pub camera_height: u32,

    // === Ball ===
    /// Ball radius is the frame diagonal divided by this
    pub radius_divisor: f32,
    /// Ball speed (pixels/ms) is the frame diagonal divided by this
    pub speed_divisor: f32,

    // === Detector ===
    /// Hand model complexity (0 = lite, 1 = full)
    pub model_complexity: u8,
    /// Maximum number of hands tracked at once
    pub max_hands: u8,

    // === Tone ===
    pub tone_frequency_hz: f32,
    /// Mean tone duration in milliseconds
    pub tone_mean_ms: f64,
    /// Spread of the tone duration in milliseconds (0 = constant)
    pub tone_deviation_ms: f64,
    /// Tone volume (0.0 - 1.0)
    pub volume: f32,
    pub muted: bool,

    // === Colors ===
    /// Obstacle outline color (CSS hex)
    pub overlay_color: String,
    /// Initial ball color (CSS hex)
    pub ball_color: String,

    /// Seed for the cosmetic RNG; wall clock when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_width: 1280,
            camera_height: 720,

            radius_divisor: DEFAULT_RADIUS_DIVISOR,
            speed_divisor: DEFAULT_SPEED_DIVISOR,

            model_complexity: 0,
            max_hands: 2,

            tone_frequency_hz: 440.0,
            tone_mean_ms: 120.0,
            tone_deviation_ms: 60.0,
            volume: 0.5,
            muted: false,

            overlay_color: "#00ff88".to_string(),
            ball_color: "#ffcc00".to_string(),

            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.camera_width == 0 || self.camera_height == 0 {
            return Err(Error::Config("camera size must be non-zero".into()));
        }
        if !(self.radius_divisor > 0.0) || !(self.speed_divisor > 0.0) {
            return Err(Error::Config("ball divisors must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(Error::Config(format!("volume {} outside 0..=1", self.volume)));
        }
        if !(self.tone_mean_ms >= 0.0) || !(self.tone_deviation_ms >= 0.0) {
            return Err(Error::Config("tone durations must be non-negative".into()));
        }
        if self.max_hands == 0 {
            return Err(Error::Config("max_hands must be at least 1".into()));
        }
        self.overlay_color()?;
        self.ball_color()?;
        Ok(())
    }

    pub fn overlay_color(&self) -> Result<Color> {
        Color::from_hex(&self.overlay_color)
    }

    pub fn ball_color(&self) -> Result<Color> {
        Color::from_hex(&self.ball_color)
    }

    /// Tone volume after mute
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hand_bounce_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
