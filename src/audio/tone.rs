use std::time::Duration;

use crate::error::ConfigError;

/// The frequencies of both voices at one point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyPair {
    /// Melody frequency in Hz.
    pub melody: f32,
    /// Bass frequency in Hz, zero for a silent bass voice.
    pub bass: f32,
}

/// One scheduled note: a melody and bass frequency held for a duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pair: FrequencyPair,
    duration: Duration,
}

impl FrequencyPair {
    pub fn new(melody: f32, bass: f32) -> Self {
        Self { melody, bass }
    }
}

impl Tone {
    /// Create a tone, checking that the melody is positive, the bass is non-negative
    /// and the duration (in seconds) is positive.
    pub fn new(melody: f32, bass: f32, duration: f64) -> Result<Self, ConfigError> {
        Self::validated(0, melody, bass, duration)
    }

    /// Same as [`Tone::new`] but errors name the tone's position in its sequence.
    pub(crate) fn validated(
        index: usize,
        melody: f32,
        bass: f32,
        duration: f64,
    ) -> Result<Self, ConfigError> {
        if !melody.is_finite() || melody <= 0.0 {
            return Err(ConfigError::InvalidFrequency {
                index,
                voice: "melody",
                value: melody,
            });
        }

        if !bass.is_finite() || bass < 0.0 {
            return Err(ConfigError::InvalidFrequency {
                index,
                voice: "bass",
                value: bass,
            });
        }

        // try_from also rejects values too large to fit in a Duration
        let invalid = || ConfigError::InvalidDuration {
            index,
            value: duration,
        };
        if duration <= 0.0 {
            return Err(invalid());
        }
        let duration = Duration::try_from_secs_f64(duration).map_err(|_| invalid())?;

        Ok(Self {
            pair: FrequencyPair::new(melody, bass),
            duration,
        })
    }

    /// Skips validation, only for constants known to be in range.
    pub(crate) fn raw(melody: f32, bass: f32, duration: f64) -> Self {
        Self {
            pair: FrequencyPair::new(melody, bass),
            duration: Duration::from_secs_f64(duration),
        }
    }

    pub fn pair(&self) -> FrequencyPair {
        self.pair
    }

    pub fn melody(&self) -> f32 {
        self.pair.melody
    }

    pub fn bass(&self) -> f32 {
        self.pair.bass
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[cfg(test)]
mod test {
    use super::Tone;
    use crate::error::ConfigError;

    #[test]
    fn test_tone_accepts_silent_bass() {
        let tone = Tone::new(440.0, 0.0, 0.25).unwrap();
        assert_eq!(tone.melody(), 440.0);
        assert_eq!(tone.bass(), 0.0);
        assert_eq!(tone.duration().as_millis(), 250);
    }

    #[test]
    fn test_tone_rejects_bad_values() {
        assert!(matches!(
            Tone::new(0.0, 65.0, 1.0),
            Err(ConfigError::InvalidFrequency { voice: "melody", .. })
        ));
        assert!(matches!(
            Tone::new(262.0, -1.0, 1.0),
            Err(ConfigError::InvalidFrequency { voice: "bass", .. })
        ));
        assert!(matches!(
            Tone::new(f32::NAN, 65.0, 1.0),
            Err(ConfigError::InvalidFrequency { .. })
        ));
        assert!(matches!(
            Tone::new(262.0, 65.0, 0.0),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(matches!(
            Tone::new(262.0, 65.0, f64::INFINITY),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(matches!(
            Tone::new(262.0, 65.0, f64::NAN),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_tone_duration_out_of_range() {
        assert!(matches!(
            Tone::new(440.0, 65.0, 1e20),
            Err(ConfigError::InvalidDuration { index: 0, .. })
        ));
        assert!(Tone::new(440.0, 65.0, 1e9).is_ok());
    }
}
