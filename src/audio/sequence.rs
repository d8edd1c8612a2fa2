//! Note sequences.
//! Playback order is insertion order.

use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use super::tone::Tone;
use crate::error::ConfigError;

const DEMO_MELODY: [f32; 17] = [
    262.0, 294.0, 330.0, 349.0, 392.0, 440.0, 494.0, 523.0, 440.0, 349.0, 330.0, 294.0, 262.0,
    220.0, 349.0, 330.0, 220.0,
];
const DEMO_BASS: [f32; 17] = [
    65.0, 73.0, 82.0, 87.0, 98.0, 110.0, 123.0, 131.0, 110.0, 87.0, 82.0, 73.0, 65.0, 55.0, 87.0,
    82.0, 55.0,
];
const DEMO_DURATIONS: [f64; 17] = [
    0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 1.0, 0.5, 0.5, 0.5, 0.5, 0.5, 1.0, 0.5, 1.0,
];

/// An ordered list of tones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sequence {
    tones: Vec<Tone>,
}

#[derive(Deserialize)]
struct RawTone {
    melody: f32,
    #[serde(default)]
    bass: f32,
    duration: f64,
}

impl Sequence {
    /// Create a new empty sequence.
    pub fn new() -> Self {
        Self { tones: Vec::new() }
    }

    /// Add a tone to the end of the sequence.
    /// Fails if the total length of the sequence would no longer fit in a [`Duration`].
    pub fn chain(mut self, tone: Tone) -> Result<Self, ConfigError> {
        self.tones.push(tone);
        Self::from_tones(self.tones)
    }

    /// Every constructor ends here, so the total duration is always representable.
    fn from_tones(tones: Vec<Tone>) -> Result<Self, ConfigError> {
        tones
            .iter()
            .try_fold(Duration::ZERO, |total, tone| total.checked_add(tone.duration()))
            .ok_or(ConfigError::SequenceTooLong)?;

        Ok(Self { tones })
    }

    /// Build a sequence from parallel arrays.
    /// All three must have the same length, entry `i` of each makes up tone `i`.
    pub fn from_parts(melody: &[f32], bass: &[f32], durations: &[f64]) -> Result<Self, ConfigError> {
        if melody.len() != bass.len() || melody.len() != durations.len() {
            return Err(ConfigError::MismatchedLengths {
                melody: melody.len(),
                bass: bass.len(),
                durations: durations.len(),
            });
        }

        let tones = melody
            .iter()
            .zip(bass)
            .zip(durations)
            .enumerate()
            .map(|(i, ((&m, &b), &d))| Tone::validated(i, m, b, d))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_tones(tones)
    }

    /// A single tone with a silent bass voice.
    pub fn single(frequency: f32, duration: f64) -> Result<Self, ConfigError> {
        Self::new().chain(Tone::new(frequency, 0.0, duration)?)
    }

    /// The built in melody, a rising and falling C major line over a matching bass.
    pub fn demo() -> Self {
        let tones = DEMO_MELODY
            .iter()
            .zip(DEMO_BASS.iter())
            .zip(DEMO_DURATIONS.iter())
            .map(|((&m, &b), &d)| Tone::raw(m, b, d))
            .collect();

        Self { tones }
    }

    /// Create a sequence from a string.
    /// The format is as follows, the bass column is optional:
    /// ```text
    /// # melody;bass;time(s)
    /// 262;65;0.5
    /// 440;1.2
    /// ```
    pub fn from_seq(seq: &str) -> Result<Self, ConfigError> {
        let mut tones = Vec::new();

        for (line_no, line) in seq.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parse_err = |reason: String| ConfigError::Parse {
                line: line_no + 1,
                reason,
            };

            let fields = line.split(';').map(str::trim).collect::<Vec<_>>();
            let (melody, bass, time) = match fields.as_slice() {
                [melody, time] => (*melody, "0", *time),
                [melody, bass, time] => (*melody, *bass, *time),
                _ => {
                    return Err(parse_err(format!(
                        "expected `melody;bass;duration`, found {} fields",
                        fields.len()
                    )))
                }
            };

            let melody = melody
                .parse::<f32>()
                .map_err(|e| parse_err(format!("melody `{melody}`: {e}")))?;
            let bass = bass
                .parse::<f32>()
                .map_err(|e| parse_err(format!("bass `{bass}`: {e}")))?;
            let time = time
                .parse::<f64>()
                .map_err(|e| parse_err(format!("duration `{time}`: {e}")))?;

            tones.push(Tone::validated(tones.len(), melody, bass, time)?);
        }

        Self::from_tones(tones)
    }

    /// Create a sequence from a json array of `{ "melody", "bass", "duration" }` objects.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str::<Vec<RawTone>>(json)?;
        let tones = raw
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tone::validated(i, t.melody, t.bass, t.duration))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_tones(tones)
    }

    /// Loads a sequence file, `.json` files are parsed as json and anything else with [`Sequence::from_seq`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read sequence `{}`", path.display()))?;

        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        let seq = match is_json {
            true => Self::from_json(&raw),
            false => Self::from_seq(&raw),
        };

        seq.with_context(|| format!("invalid sequence `{}`", path.display()))
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    pub fn first(&self) -> Option<&Tone> {
        self.tones.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tone> {
        self.tones.iter()
    }

    /// Sum of every tone's duration.
    pub fn total_duration(&self) -> Duration {
        self.tones
            .iter()
            .fold(Duration::ZERO, |total, tone| total.saturating_add(tone.duration()))
    }

    /// Index of the tone that is current `elapsed` after playback started.
    /// Returns None once the whole sequence has played.
    pub fn index_at(&self, elapsed: Duration) -> Option<usize> {
        let mut end = Duration::ZERO;
        for (i, tone) in self.tones.iter().enumerate() {
            end = end.saturating_add(tone.duration());
            if elapsed < end {
                return Some(i);
            }
        }

        None
    }
}
