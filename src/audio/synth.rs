//! The buffer filling side of playback.
//! Pulled by the output stream at whatever rate and buffer size the device wants.

use std::{mem, sync::Arc};

use super::{cell::FrequencyCell, cursor::TimeCursor, mixer::Mixer, tap::WaveformTap};
use crate::{config::PlayerConfig, error::ConfigError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillStatus {
    /// The buffer holds the current tone.
    Playing,
    /// The sequence is over, the buffer was filled with silence.
    Exhausted,
}

pub struct ToneSynth {
    cursor: TimeCursor,
    mixer: Mixer,
    cell: Arc<FrequencyCell>,
    tap: Option<Arc<WaveformTap>>,
    scratch: Vec<f32>,
}

impl ToneSynth {
    pub fn new(config: &PlayerConfig, cell: Arc<FrequencyCell>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mixer = config.mixer()?;

        if mixer.headroom() > 1.0 && !mixer.is_clamped() {
            log::warn!(
                "Melody and bass gain add up to {}, output may clip",
                mixer.headroom()
            );
        }

        Ok(Self {
            cursor: TimeCursor::new(config.sample_rate)?,
            mixer,
            cell,
            tap: None,
            scratch: Vec::with_capacity(config.buffer_size as usize),
        })
    }

    /// Publish every generated buffer to `tap`.
    pub fn with_tap(mut self, tap: Arc<WaveformTap>) -> Self {
        self.tap = Some(tap);
        self
    }

    /// Fills all of `out` with mono samples.
    /// Once the sequence is finished this writes silence and leaves the cursor where it is.
    pub fn fill(&mut self, out: &mut [f32]) -> FillStatus {
        // One read per buffer so the frequencies can't change part way through it
        let status = match self.cell.get() {
            Some(pair) => {
                let interval = self.cursor.advance(out.len());
                self.mixer.mix(&interval, pair, out);
                FillStatus::Playing
            }
            None => {
                out.fill(0.0);
                FillStatus::Exhausted
            }
        };

        if let Some(tap) = &self.tap {
            tap.publish(out);
        }

        status
    }

    /// Allocates and fills a buffer of `frames` samples.
    pub fn chunk(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.fill(&mut out);
        out
    }

    /// Fills an interleaved buffer, writing the same sample to every channel of a frame.
    /// Trailing samples that don't make up a whole frame are zeroed.
    pub fn fill_interleaved(&mut self, out: &mut [f32], channels: usize) -> FillStatus {
        let channels = channels.max(1);
        let frames = out.len() / channels;

        let mut scratch = mem::take(&mut self.scratch);
        scratch.resize(frames, 0.0);
        let status = self.fill(&mut scratch);

        for (frame, &sample) in out.chunks_exact_mut(channels).zip(scratch.iter()) {
            frame.fill(sample);
        }
        out[frames * channels..].fill(0.0);

        self.scratch = scratch;
        status
    }

    /// Seconds of audio generated so far.
    pub fn elapsed(&self) -> f64 {
        self.cursor.elapsed()
    }
}

#[cfg(test)]
mod test {
    use std::{
        f64::consts::TAU,
        sync::Arc,
        thread,
        time::{Duration, Instant},
    };

    use crossbeam::channel;
    use rand::Rng;

    use super::{FillStatus, ToneSynth};
    use crate::{
        audio::{
            cell::FrequencyCell,
            sequence::Sequence,
            sequencer::{NoteSequencer, Outcome},
            tap::WaveformTap,
            tone::FrequencyPair,
        },
        config::PlayerConfig,
        error::ConfigError,
    };

    fn synth(seq: &Sequence) -> (ToneSynth, Arc<FrequencyCell>) {
        let cell = Arc::new(FrequencyCell::for_sequence(seq));
        let synth = ToneSynth::new(&PlayerConfig::default(), cell.clone()).unwrap();
        (synth, cell)
    }

    #[test]
    fn test_invalid_config() {
        let cfg = PlayerConfig {
            sample_rate: 0,
            ..Default::default()
        };
        let cell = Arc::new(FrequencyCell::new(None));
        assert!(matches!(
            ToneSynth::new(&cfg, cell),
            Err(ConfigError::ZeroSampleRate)
        ));
    }

    #[test]
    fn test_fill_exact_length() {
        let (mut synth, _) = synth(&Sequence::demo());
        for n in [0, 1, 7, 64, 441, 1024, 4096] {
            assert_eq!(synth.chunk(n).len(), n);
        }
        let frames = 1 + 7 + 64 + 441 + 1024 + 4096;
        assert!((synth.elapsed() - frames as f64 / 44100.0).abs() < 1e-12);
    }

    #[test]
    fn test_phase_continuity() {
        let mut rng = rand::thread_rng();

        for _ in 0..32 {
            let sample_rate = rng.gen_range(8000..=96000);
            let freq = rng.gen_range(20.0..4000.0f32);
            let seq = Sequence::single(freq, 1.0).unwrap();
            let cell = Arc::new(FrequencyCell::for_sequence(&seq));
            let cfg = PlayerConfig {
                sample_rate,
                melody_gain: 1.0,
                bass_gain: 0.0,
                ..Default::default()
            };
            let mut synth = ToneSynth::new(&cfg, cell).unwrap();

            let n = rng.gen_range(1..2048);
            let first = synth.chunk(n);
            let second = synth.chunk(rng.gen_range(1..2048));

            // Phase of the last sample of the first chunk, stepped forward by one sample
            let step = TAU * freq as f64 / sample_rate as f64;
            let last_phase = TAU * freq as f64 * (n - 1) as f64 / sample_rate as f64;
            assert!((first[n - 1] as f64 - last_phase.sin()).abs() < 1e-4);
            assert!((second[0] as f64 - (last_phase + step).sin()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_chunked_matches_single_buffer() {
        let seq = Sequence::single(440.0, 1.0).unwrap();
        let (mut whole, _) = synth(&seq);
        let (mut parts, _) = synth(&seq);

        let expected = whole.chunk(3000);
        let mut got = Vec::new();
        for n in [1000, 24, 1, 975, 1000] {
            got.extend(parts.chunk(n));
        }

        assert_eq!(expected, got);
    }

    #[test]
    fn test_exhausted() {
        let (mut synth, cell) = synth(&Sequence::single(440.0, 1.0).unwrap());
        let mut buf = [1.0; 64];

        assert_eq!(synth.fill(&mut buf), FillStatus::Playing);
        cell.finish();
        assert_eq!(synth.fill(&mut buf), FillStatus::Exhausted);
        assert!(buf.iter().all(|x| *x == 0.0));
        assert_eq!(synth.elapsed(), 64.0 / 44100.0);
    }

    #[test]
    fn test_empty_sequence_is_silent() {
        let (mut synth, _) = synth(&Sequence::new());
        for n in [0, 1, 512, 1024] {
            let mut buf = vec![0.7; n];
            assert_eq!(synth.fill(&mut buf), FillStatus::Exhausted);
            assert!(buf.iter().all(|x| *x == 0.0));
        }
    }

    #[test]
    fn test_frequency_change_between_chunks() {
        let (mut synth, cell) = synth(&Sequence::demo());
        synth.chunk(100);
        cell.set(FrequencyPair::new(440.0, 110.0));

        let out = synth.chunk(1);
        let t = 100.0 / 44100.0;
        let expected = 0.5 * (TAU * 440.0 * t).sin() + 0.3 * (TAU * 110.0 * t).sin();
        assert!((out[0] as f64 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_fill_interleaved() {
        let (mut mono, _) = synth(&Sequence::demo());
        let (mut stereo, _) = synth(&Sequence::demo());

        let expected = mono.chunk(256);
        let mut out = vec![9.0; 256 * 2 + 1];
        assert_eq!(stereo.fill_interleaved(&mut out, 2), FillStatus::Playing);

        for (i, frame) in out[..512].chunks(2).enumerate() {
            assert_eq!(frame, [expected[i], expected[i]]);
        }
        assert_eq!(out[512], 0.0);
    }

    #[test]
    fn test_tap_sees_buffer() {
        let seq = Sequence::demo();
        let tap = Arc::new(WaveformTap::new());
        let (synth, _) = synth(&seq);
        let mut synth = synth.with_tap(tap.clone());

        let out = synth.chunk(128);
        assert_eq!(tap.latest(), out);
    }

    #[test]
    fn test_end_to_end_single_note() {
        let seq = Sequence::from_parts(&[262.0], &[65.0], &[0.5]).unwrap();
        let (mut synth, cell) = synth(&seq);

        // Drive the synth like a device would, until half a second of audio has been pulled
        let total = (seq.total_duration().as_secs_f64() * 44100.0) as usize;
        let mut samples = Vec::new();
        while samples.len() < total {
            let n = 1024.min(total - samples.len());
            samples.extend(synth.chunk(n));
        }

        assert_eq!(samples.len(), 22050);
        assert_eq!(samples[0], 0.0);
        assert!(samples.iter().all(|x| x.abs() <= 0.8 + 1e-6));

        // gcd(262, 65) = 1, so the sum repeats every second
        synth.chunk(44100 - 22050);
        let next_second = synth.chunk(22050);
        for (a, b) in samples.iter().zip(next_second.iter()) {
            assert!((a - b).abs() < 1e-4);
        }

        cell.finish();
        let mut next = vec![0.0; 22050];
        assert_eq!(synth.fill(&mut next), FillStatus::Exhausted);
        assert!(next.iter().all(|x| *x == 0.0));
    }

    /// Pulls 10ms buffers in real time until the synth runs dry.
    /// Returns the seconds of audio generated while playing and the wall time until the first silent buffer.
    fn pull_until_exhausted(synth: &mut ToneSynth) -> (f64, Duration) {
        let start = Instant::now();
        let mut buf = vec![0.0; 441];
        let mut playing = 0;

        while synth.fill(&mut buf) == FillStatus::Playing {
            playing += buf.len();
            assert!(start.elapsed() < Duration::from_secs(5), "Sequencer never finished");
            thread::sleep(Duration::from_millis(10));
        }

        (playing as f64 / 44100.0, start.elapsed())
    }

    #[test]
    fn test_sequencer_drives_synth() {
        let seq = Arc::new(Sequence::from_parts(&[440.0, 330.0], &[110.0, 0.0], &[0.1, 0.1]).unwrap());
        let (mut synth, cell) = synth(&seq);
        let (_stop_tx, stop_rx) = channel::bounded(1);

        let sequencer = NoteSequencer::new(seq.clone(), cell);
        let handle = thread::spawn(move || sequencer.run(&stop_rx));

        let (audio, wall) = pull_until_exhausted(&mut synth);
        assert!(wall >= seq.total_duration());
        assert!((0.05..0.4).contains(&audio), "{audio}s of audio");
        assert!((synth.elapsed() - audio).abs() < 1e-9);

        for _ in 0..8 {
            let mut buf = vec![1.0; 441];
            assert_eq!(synth.fill(&mut buf), FillStatus::Exhausted);
            assert!(buf.iter().all(|x| *x == 0.0));
        }

        assert_eq!(handle.join().unwrap(), Outcome::Finished);
    }

    #[test]
    fn test_stop_far_tone_silences_synth() {
        let seq = Arc::new(Sequence::from_parts(&[440.0, 220.0], &[0.0, 0.0], &[1e9, 1e9]).unwrap());
        let (mut synth, cell) = synth(&seq);
        let (stop_tx, stop_rx) = channel::bounded(1);

        let sequencer = NoteSequencer::new(seq, cell);
        let handle = thread::spawn(move || sequencer.run(&stop_rx));

        thread::sleep(Duration::from_millis(50));
        let mut buf = vec![0.0; 441];
        assert_eq!(synth.fill(&mut buf), FillStatus::Playing);

        stop_tx.send(()).unwrap();
        assert_eq!(handle.join().unwrap(), Outcome::Cancelled);
        assert_eq!(synth.fill(&mut buf), FillStatus::Exhausted);
        assert!(buf.iter().all(|x| *x == 0.0));
    }
}
