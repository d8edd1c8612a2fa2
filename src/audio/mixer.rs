use std::f64::consts::TAU;

use super::{cursor::TimeInterval, tone::FrequencyPair};
use crate::error::ConfigError;

pub const DEFAULT_MELODY_GAIN: f32 = 0.5;
pub const DEFAULT_BASS_GAIN: f32 = 0.3;

/// Sums a melody and a bass sine voice, each with a fixed gain.
#[derive(Clone, Copy, Debug)]
pub struct Mixer {
    melody_gain: f32,
    bass_gain: f32,
    clamp: bool,
}

impl Mixer {
    pub fn new(melody_gain: f32, bass_gain: f32) -> Result<Self, ConfigError> {
        for (voice, value) in [("melody", melody_gain), ("bass", bass_gain)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidGain { voice, value });
            }
        }

        Ok(Self {
            melody_gain,
            bass_gain,
            clamp: false,
        })
    }

    /// Limit the output to [-1, 1].
    /// Off by default, the unclamped sum can leave that range when the gains add up to more than one.
    pub fn clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Worst case amplitude, both voices peaking together.
    pub fn headroom(&self) -> f32 {
        self.melody_gain + self.bass_gain
    }

    pub fn is_clamped(&self) -> bool {
        self.clamp
    }

    /// Writes one sample per point of `interval` into `out`.
    /// `out` must be exactly as long as the interval.
    pub fn mix(&self, interval: &TimeInterval, pair: FrequencyPair, out: &mut [f32]) {
        debug_assert_eq!(interval.len(), out.len());

        let melody = TAU * pair.melody as f64;
        let bass = TAU * pair.bass as f64;
        let (mg, bg) = (self.melody_gain as f64, self.bass_gain as f64);

        for (sample, t) in out.iter_mut().zip(interval.times()) {
            let raw = (mg * (melody * t).sin() + bg * (bass * t).sin()) as f32;
            *sample = match self.clamp {
                true => raw.clamp(-1.0, 1.0),
                false => raw,
            };
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            melody_gain: DEFAULT_MELODY_GAIN,
            bass_gain: DEFAULT_BASS_GAIN,
            clamp: false,
        }
    }
}
