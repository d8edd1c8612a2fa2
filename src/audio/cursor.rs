//! Playback time tracking.
//!
//! Sine phase is derived from the absolute time of each sample rather than reset per buffer,
//! so a constant frequency stays continuous across buffer seams.
//! Time is kept as a frame count to avoid drift from summing `frames / sample_rate` over a long session.

use crate::error::ConfigError;

/// Elapsed playback time of one session, in frames.
#[derive(Clone, Debug)]
pub struct TimeCursor {
    sample_rate: u32,
    frame: u64,
}

/// The half open span `[start, start + frames / sample_rate)`, sampled at `frames` evenly spaced points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeInterval {
    start_frame: u64,
    frames: usize,
    sample_rate: u32,
}

impl TimeCursor {
    pub fn new(sample_rate: u32) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }

        Ok(Self {
            sample_rate,
            frame: 0,
        })
    }

    /// Returns the interval covered by the next `frames` samples and moves past it.
    /// Call this exactly once per generated buffer.
    pub fn advance(&mut self, frames: usize) -> TimeInterval {
        let interval = TimeInterval {
            start_frame: self.frame,
            frames,
            sample_rate: self.sample_rate,
        };

        self.frame += frames as u64;
        interval
    }

    /// Elapsed time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }
}

impl TimeInterval {
    /// Time of the first sample in seconds.
    pub fn start(&self) -> f64 {
        self.start_frame as f64 / self.sample_rate as f64
    }

    /// Exclusive end of the interval in seconds.
    pub fn end(&self) -> f64 {
        (self.start_frame + self.frames as u64) as f64 / self.sample_rate as f64
    }

    pub fn len(&self) -> usize {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Time of sample `i` in seconds.
    pub fn time(&self, i: usize) -> f64 {
        (self.start_frame + i as u64) as f64 / self.sample_rate as f64
    }

    /// The time of every sample in the interval.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.frames).map(|i| self.time(i))
    }
}

#[cfg(test)]
mod test {
    use super::TimeCursor;
    use crate::error::ConfigError;

    #[test]
    fn test_zero_sample_rate() {
        assert!(matches!(TimeCursor::new(0), Err(ConfigError::ZeroSampleRate)));
    }

    #[test]
    fn test_advance() {
        let mut cursor = TimeCursor::new(4).unwrap();
        let first = cursor.advance(2);
        let second = cursor.advance(4);

        assert_eq!(first.times().collect::<Vec<_>>(), [0.0, 0.25]);
        assert_eq!(first.end(), second.start());
        assert_eq!(second.times().collect::<Vec<_>>(), [0.5, 0.75, 1.0, 1.25]);
        assert_eq!(cursor.elapsed(), 1.5);
        assert_eq!(cursor.advance(1).start(), 1.5);
    }

    #[test]
    fn test_advance_zero() {
        let mut cursor = TimeCursor::new(44100).unwrap();
        let interval = cursor.advance(0);

        assert!(interval.is_empty());
        assert_eq!(interval.start(), interval.end());
        assert_eq!(cursor.elapsed(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut cursor = TimeCursor::new(44100).unwrap();
        cursor.advance(1024);
        cursor.reset();

        assert_eq!(cursor.elapsed(), 0.0);
        assert_eq!(cursor.advance(1).start(), 0.0);
    }

    #[test]
    fn test_no_drift() {
        let mut cursor = TimeCursor::new(44100).unwrap();
        for _ in 0..44100 / 441 * 60 {
            cursor.advance(441);
        }

        assert_eq!(cursor.elapsed(), 60.0);
    }
}
