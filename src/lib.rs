//! Sequenced sine tone synthesis.
//!
//! A [`audio::sequencer::NoteSequencer`] steps through a [`audio::sequence::Sequence`] on the wall
//! clock while an output stream pulls buffers from a [`audio::synth::ToneSynth`].

pub mod audio;
pub mod config;
pub mod controls;
pub mod error;
pub mod logger;
pub mod misc;
pub mod session;
