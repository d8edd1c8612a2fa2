//! Audio utilities.
//! Tone synthesis and sequencing.

pub mod cell;
pub mod cursor;
pub mod devices;
pub mod mixer;
pub mod sequence;
pub mod sequencer;
pub mod synth;
pub mod tap;
pub mod tone;
