//! Contains the [`OutputDevice`] struct and the [`find_output_device`] function.
//! Used at startup to pick the device the tones are played on.

use anyhow::{Context, Result};
use cpal::{
    traits::{DeviceTrait, HostTrait},
    BufferSize, Device, SampleRate, StreamConfig, SupportedBufferSize, SupportedStreamConfig,
};

use crate::{config::PlayerConfig, misc::Similarity};

/// A cpal output device and its default stream config.
pub struct OutputDevice {
    pub device: Device,
    pub name: String,
    pub supported: SupportedStreamConfig,
}

/// Picks an output device by name, or the host default for `default`.
/// Note: The device is picked by finding the one with the highest string similarity (dice coefficient) to the given name.
pub fn find_output_device(wanted: &str) -> Result<OutputDevice> {
    let host = cpal::default_host();

    let device = match wanted.to_lowercase().as_str() {
        "default" => host
            .default_output_device()
            .context("No default output device")?,
        wanted => host
            .output_devices()
            .context("Failed to list output devices")?
            .map(|x| (x.name().unwrap_or_default().similarity(&wanted.to_owned()), x))
            .reduce(|a, b| if a.0 >= b.0 { a } else { b })
            .context("No output device found")?
            .1,
    };

    let name = device.name().unwrap_or_else(|_| "<unknown>".to_owned());
    let supported = device
        .default_output_config()
        .with_context(|| format!("No default output config for `{name}`"))?;

    Ok(OutputDevice {
        device,
        name,
        supported,
    })
}

impl OutputDevice {
    pub fn channels(&self) -> u16 {
        self.supported.channels()
    }

    /// Copy of `config` with the sample rate the stream will actually run at.
    /// That is the requested rate if the device supports it at its channel count,
    /// otherwise the device's default rate.
    pub fn resolve_config(&self, config: &PlayerConfig) -> PlayerConfig {
        let ranges = match self.device.supported_output_configs() {
            Ok(configs) => configs
                .filter(|x| x.channels() == self.channels())
                .map(|x| (x.min_sample_rate().0, x.max_sample_rate().0))
                .collect::<Vec<_>>(),
            Err(e) => {
                log::warn!("Failed to query configs of `{}`: {e}", self.name);
                Vec::new()
            }
        };

        let fallback = self.supported.sample_rate().0;
        let sample_rate = pick_sample_rate(&ranges, config.sample_rate, fallback);
        if sample_rate != config.sample_rate {
            log::warn!(
                "`{}` doesn't support {}Hz, using {}Hz",
                self.name,
                config.sample_rate,
                sample_rate
            );
        }

        PlayerConfig {
            sample_rate,
            ..config.clone()
        }
    }

    /// Stream config for the device at the config's sample rate, see [`OutputDevice::resolve_config`].
    /// The requested buffer size is only used if the device reports that it supports it.
    pub fn stream_config(&self, config: &PlayerConfig) -> StreamConfig {
        let buffer_size = match self.supported.buffer_size() {
            SupportedBufferSize::Range { min, max }
                if (*min..=*max).contains(&config.buffer_size) =>
            {
                BufferSize::Fixed(config.buffer_size)
            }
            _ => {
                log::warn!(
                    "Buffer size {} not supported by `{}`, using the device default",
                    config.buffer_size,
                    self.name
                );
                BufferSize::Default
            }
        };

        StreamConfig {
            channels: self.channels(),
            sample_rate: SampleRate(config.sample_rate),
            buffer_size,
        }
    }
}

/// `wanted` if any `(min, max)` range contains it, otherwise `fallback`.
fn pick_sample_rate(ranges: &[(u32, u32)], wanted: u32, fallback: u32) -> u32 {
    match ranges.iter().any(|(min, max)| (*min..=*max).contains(&wanted)) {
        true => wanted,
        false => fallback,
    }
}
