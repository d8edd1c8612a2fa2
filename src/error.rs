//! Configuration errors.
//! Everything here is reported when a sequence or synth is built, never while streaming.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
    #[error("buffer size must be greater than zero")]
    ZeroBufferSize,
    #[error("{voice} gain must be a finite, non-negative number (got {value})")]
    InvalidGain { voice: &'static str, value: f32 },
    #[error(
        "sequence arrays differ in length ({melody} melody, {bass} bass, {durations} durations)"
    )]
    MismatchedLengths {
        melody: usize,
        bass: usize,
        durations: usize,
    },
    #[error("sequence is too long, its total duration overflows")]
    SequenceTooLong,
    #[error("sequence has no tones")]
    EmptySequence,
    #[error("tone {index}: {voice} frequency {value} is out of range")]
    InvalidFrequency {
        index: usize,
        voice: &'static str,
        value: f32,
    },
    #[error("tone {index}: duration {value}s must be positive")]
    InvalidDuration { index: usize, value: f64 },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("invalid sequence json: {0}")]
    Json(#[from] serde_json::Error),
}
