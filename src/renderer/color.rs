//! Ball colors

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum hue change (degrees) between consecutive palette colors
pub const MIN_HUE_STEP: f32 = 60.0;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (or `rrggbb`)
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::Config(format!("bad color {s:?}")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| Error::Config(format!("bad color {s:?}")))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// CSS `#rrggbb` form
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build from HSV (hue in degrees, saturation/value in 0..=1)
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = value * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = value - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

/// Seeded source of ball colors
///
/// Each new color is a bright hue at least [`MIN_HUE_STEP`] degrees away
/// from the previous one so every change is visible.
#[derive(Debug, Clone)]
pub struct Palette {
    rng: Pcg32,
    hue: f32,
}

impl Palette {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let hue = rng.random_range(0.0..360.0);
        Self { rng, hue }
    }

    /// Current hue in degrees
    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn next_color(&mut self) -> Color {
        let step = self.rng.random_range(MIN_HUE_STEP..(360.0 - MIN_HUE_STEP));
        self.hue = (self.hue + step).rem_euclid(360.0);
        Color::from_hsv(self.hue, 0.85, 1.0)
    }
}
