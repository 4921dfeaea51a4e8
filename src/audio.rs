//! Bounce tone
//!
//! A single short sine blip whose length is drawn from a sampler. On the
//! web it is synthesized with the Web Audio API; elsewhere it is logged.

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg32;

use crate::error::{Error, Result};

/// Fire-and-forget tone output
pub trait ToneSink {
    fn play_tone(&mut self, duration_ms: f64);
}

/// Source of tone durations in milliseconds
pub trait DurationSampler {
    fn sample_duration(&mut self) -> f64;
}

/// Always the same duration
#[derive(Debug, Clone, Copy)]
pub struct ConstantDuration(pub f64);

impl DurationSampler for ConstantDuration {
    fn sample_duration(&mut self) -> f64 {
        self.0.max(0.0)
    }
}

/// `max(0, x)` with `x ~ Normal(mean, deviation)`
#[derive(Debug, Clone)]
pub struct HalfNormalDuration {
    normal: Normal<f64>,
    rng: Pcg32,
}

impl HalfNormalDuration {
    pub fn new(mean: f64, deviation: f64, seed: u64) -> Result<Self> {
        let normal = Normal::new(mean, deviation)
            .map_err(|e| Error::Config(format!("tone duration ({mean}, {deviation}): {e}")))?;
        Ok(Self {
            normal,
            rng: Pcg32::seed_from_u64(seed),
        })
    }
}

impl DurationSampler for HalfNormalDuration {
    fn sample_duration(&mut self) -> f64 {
        self.normal.sample(&mut self.rng).max(0.0)
    }
}

/// Tone sink for hosts without audio
#[derive(Debug, Default)]
pub struct LogTone {
    pub played: u32,
}

impl ToneSink for LogTone {
    fn play_tone(&mut self, duration_ms: f64) {
        self.played += 1;
        log::debug!("Tone {} ({:.0} ms)", self.played, duration_ms);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::ToneSink;

    /// Web Audio tone generator
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        frequency: f32,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(frequency: f32, volume: f32) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                frequency,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(&self, ctx: &AudioContext) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(OscillatorType::Sine);
            osc.frequency().set_value(self.frequency);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    impl ToneSink for AudioManager {
        fn play_tone(&mut self, duration_ms: f64) {
            if self.volume <= 0.0 || duration_ms <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers start the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some((osc, gain)) = self.create_osc(ctx) else {
                return;
            };
            let t = ctx.current_time();
            let end = t + duration_ms / 1000.0;

            gain.gain().set_value_at_time(self.volume, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();

            osc.start().ok();
            osc.stop_with_when(end).ok();
        }
    }
}
