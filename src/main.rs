use anyhow::{Context, Result};
use clap::Parser;

use tone_player::{
    audio::{devices, sequence::Sequence, sequencer::Outcome},
    error::ConfigError,
    logger, session,
};

mod args;

fn main() -> Result<()> {
    let args = args::Args::parse();
    logger::init(args.verbose);

    let config = args.player_config();
    config.validate().context("Invalid configuration")?;

    let sequence = match &args.command {
        args::Command::Melody { sequence: Some(path) } => Sequence::load(path)?,
        args::Command::Melody { sequence: None } => Sequence::demo(),
        args::Command::Tone {
            frequency,
            duration,
        } => Sequence::single(*frequency, *duration)?,
    };

    if sequence.is_empty() {
        return Err(ConfigError::EmptySequence.into());
    }

    let device = devices::find_output_device(&args.output_device)?;
    log::info!(
        "Output hooked into `{}` ({}Hz, {} channels)",
        device.name,
        device.supported.sample_rate().0,
        device.channels()
    );

    if session::play(sequence, &config, &device)? == Outcome::Cancelled {
        println!("Playback interrupted.");
    }

    Ok(())
}
