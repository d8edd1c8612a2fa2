//! Wall clock note sequencer.
//! Walks through a [`Sequence`], publishing each tone's frequencies to a [`FrequencyCell`]
//! and holding it for the tone's duration. It never touches the sample stream itself,
//! a buffer generated around a transition may still use the previous tone's frequencies.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam::channel::{Receiver, RecvTimeoutError};

use super::{cell::FrequencyCell, sequence::Sequence};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every tone was played for its full duration.
    Finished,
    /// A stop signal arrived (or every stop sender was dropped) before the end.
    Cancelled,
}

pub struct NoteSequencer {
    sequence: Arc<Sequence>,
    cell: Arc<FrequencyCell>,
}

impl NoteSequencer {
    pub fn new(sequence: Arc<Sequence>, cell: Arc<FrequencyCell>) -> Self {
        Self { sequence, cell }
    }

    /// Offset from the start of playback at which each tone ends.
    pub fn deadlines(&self) -> Vec<Duration> {
        self.sequence
            .iter()
            .scan(Duration::ZERO, |end, tone| {
                *end = end.saturating_add(tone.duration());
                Some(*end)
            })
            .collect()
    }

    /// Plays the sequence, blocking until it ends or `stop` fires.
    /// The cell is always left finished.
    pub fn run(&self, stop: &Receiver<()>) -> Outcome {
        let start = Instant::now();

        for (i, (tone, end)) in self.sequence.iter().zip(self.deadlines()).enumerate() {
            self.cell.set(tone.pair());
            log::debug!(
                "Tone {}/{}: {}Hz + {}Hz for {:?}",
                i + 1,
                self.sequence.len(),
                tone.melody(),
                tone.bass(),
                tone.duration()
            );

            // Deadlines are measured from the start so wake up latency doesn't add up
            let wait = match start.checked_add(end) {
                Some(deadline) => stop.recv_deadline(deadline),
                // Too far out for the clock, only a stop can end this tone
                None => stop.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match wait {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    self.cell.finish();
                    log::debug!("Sequencer stopped at tone {}", i + 1);
                    return Outcome::Cancelled;
                }
            }
        }

        self.cell.finish();
        Outcome::Finished
    }
}
