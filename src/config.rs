use crate::{
    audio::mixer::{Mixer, DEFAULT_BASS_GAIN, DEFAULT_MELODY_GAIN},
    error::ConfigError,
};

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_BUFFER_SIZE: u32 = 1024;

/// Settings for one playback session.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Samples per second of the output stream.
    pub sample_rate: u32,
    /// Frames requested per buffer, the device may pick another size if it can't do this one.
    pub buffer_size: u32,
    pub melody_gain: f32,
    pub bass_gain: f32,
    /// Clamp mixed samples to [-1, 1].
    pub clamp: bool,
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }

        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }

        self.mixer().map(|_| ())
    }

    pub fn mixer(&self) -> Result<Mixer, ConfigError> {
        Ok(Mixer::new(self.melody_gain, self.bass_gain)?.clamp(self.clamp))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            melody_gain: DEFAULT_MELODY_GAIN,
            bass_gain: DEFAULT_BASS_GAIN,
            clamp: false,
        }
    }
}
