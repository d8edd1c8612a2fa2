use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tone_player::{
    audio::mixer::{DEFAULT_BASS_GAIN, DEFAULT_MELODY_GAIN},
    config::{PlayerConfig, DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE},
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output device to use, picked by closest name match.
    #[arg(short, long, global = true, default_value = "default")]
    pub output_device: String,

    /// Output sample rate in Hz.
    #[arg(short = 'r', long, global = true, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Frames per buffer requested from the device.
    #[arg(short, long, global = true, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: u32,

    /// Melody volume.
    #[arg(short, long, global = true, default_value_t = DEFAULT_MELODY_GAIN)]
    pub gain: f32,

    /// Bass volume.
    #[arg(long, global = true, default_value_t = DEFAULT_BASS_GAIN)]
    pub bass_gain: f32,

    /// Clamp the mixed output to [-1, 1].
    #[arg(long, global = true)]
    pub clamp: bool,

    /// More logging, can be repeated.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Plays a melody with a bass line.
    #[command(alias = "m")]
    Melody {
        /// Sequence file, `melody;bass;seconds` per line or a json array.
        /// Plays the built in melody if not given.
        #[arg(short, long)]
        sequence: Option<PathBuf>,
    },
    /// Plays a single sine tone.
    #[command(alias = "t")]
    Tone {
        /// Frequency in Hz.
        #[arg(default_value_t = 440.0)]
        frequency: f32,

        /// Length in seconds.
        #[arg(short, long, default_value_t = 2.0)]
        duration: f64,
    },
}

impl Args {
    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            sample_rate: self.sample_rate,
            buffer_size: self.buffer_size,
            melody_gain: self.gain,
            bass_gain: self.bass_gain,
            clamp: self.clamp,
        }
    }
}

#[cfg(test)]
mod test {
    use clap::{CommandFactory, Parser};

    use super::{Args, Command};

    #[test]
    fn test_args_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_tone_args() {
        let args = Args::parse_from(["tone-player", "tone", "262", "-d", "0.5", "--clamp"]);
        assert!(matches!(
            args.command,
            Command::Tone {
                frequency,
                duration
            } if frequency == 262.0 && duration == 0.5
        ));

        let cfg = args.player_config();
        assert!(cfg.clamp);
        assert_eq!(cfg.sample_rate, 44100);
        assert_eq!(cfg.melody_gain, 0.5);
        assert_eq!(cfg.bass_gain, 0.3);
    }

    #[test]
    fn test_melody_args() {
        let args = Args::parse_from(["tone-player", "-r", "48000", "melody", "-s", "song.seq"]);
        assert_eq!(args.sample_rate, 48000);
        assert!(matches!(args.command, Command::Melody { sequence: Some(_) }));
    }
}
