//! One playback run: an output stream pulling from a [`ToneSynth`] while a
//! [`NoteSequencer`] thread steps through the tones.
//! The two only share the frequency cell.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use cpal::{
    traits::{DeviceTrait, StreamTrait},
    OutputCallbackInfo, Stream,
};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};

use crate::{
    audio::{
        cell::FrequencyCell,
        devices::OutputDevice,
        sequence::Sequence,
        sequencer::{NoteSequencer, Outcome},
        synth::ToneSynth,
        tap::WaveformTap,
    },
    config::PlayerConfig,
    controls::{InterruptGuard, KeyWatcher},
};

/// How often the output level is logged while playing.
const METER_INTERVAL: Duration = Duration::from_millis(500);

/// Plays `sequence` on `device`, blocking until it ends or the user stops it.
/// The stream and the terminal are released before this returns.
/// The synth runs at the sample rate the device accepts, which may differ from `config`.
pub fn play(sequence: Sequence, config: &PlayerConfig, device: &OutputDevice) -> Result<Outcome> {
    let config = &device.resolve_config(config);
    let sequence = Arc::new(sequence);
    let cell = Arc::new(FrequencyCell::for_sequence(&sequence));
    let tap = Arc::new(WaveformTap::new());
    let synth = ToneSynth::new(config, cell.clone())?.with_tap(tap.clone());

    log::info!(
        "Playing {} tones ({:.1}s) on `{}` at {}Hz",
        sequence.len(),
        sequence.total_duration().as_secs_f32(),
        device.name,
        config.sample_rate
    );

    let stream = open_stream(device, config, synth)?;
    stream.play().context("Failed to start output stream")?;

    let (stop_tx, stop_rx) = channel::bounded(1);
    let interrupt = InterruptGuard::install(stop_tx.clone())?;
    let keys = KeyWatcher::spawn(stop_tx.clone())?;

    let (done_tx, done_rx) = channel::bounded(1);
    let sequencer = NoteSequencer::new(sequence, cell);
    let handle = thread::Builder::new()
        .name("sequencer".to_owned())
        .spawn(move || {
            let _ = done_tx.send(sequencer.run(&stop_rx));
        })
        .context("Failed to spawn sequencer")?;

    let outcome = wait_for(&done_rx, handle, &tap);

    // Release the device first, then the terminal
    drop(stream);
    drop(keys);
    drop(interrupt);
    drop(stop_tx);

    let outcome = outcome?;
    log::debug!("Session ended: {outcome:?}");
    Ok(outcome)
}

/// Blocks until the sequencer reports how it ended, logging the output level meanwhile.
/// The channel closing without an outcome means the sequencer thread died.
fn wait_for(
    done: &Receiver<Outcome>,
    handle: JoinHandle<()>,
    tap: &WaveformTap,
) -> Result<Outcome> {
    let outcome = loop {
        match done.recv_timeout(METER_INTERVAL) {
            Ok(outcome) => break Some(outcome),
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("Level: peak {:.3}, rms {:.3}", tap.peak(), tap.rms())
            }
            Err(RecvTimeoutError::Disconnected) => break None,
        }
    };

    let joined = handle.join();
    match (outcome, joined) {
        (Some(outcome), Ok(())) => Ok(outcome),
        _ => Err(anyhow!("Sequencer thread panicked")),
    }
}

fn open_stream(device: &OutputDevice, config: &PlayerConfig, mut synth: ToneSynth) -> Result<Stream> {
    let stream_config = device.stream_config(config);
    let channels = stream_config.channels as usize;
    log::debug!(
        "Stream config: {} channels, {}Hz, {:?}",
        channels,
        stream_config.sample_rate.0,
        stream_config.buffer_size
    );

    device
        .device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _info: &OutputCallbackInfo| {
                synth.fill_interleaved(data, channels);
            },
            move |err| log::error!("Output stream error: {err}"),
            None,
        )
        .with_context(|| format!("Failed to open output stream on `{}`", device.name))
}
