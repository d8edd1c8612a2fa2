//! Single slot hand off of the current frequency pair.
//!
//! Both frequencies are packed into one `AtomicU64` so the reader always sees a pair
//! that was written together. An all ones word (two NaN patterns, never produced by a
//! validated tone) marks the end of the sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use super::{sequence::Sequence, tone::FrequencyPair};

const FINISHED: u64 = u64::MAX;

pub struct FrequencyCell {
    inner: AtomicU64,
}

impl FrequencyCell {
    /// `None` creates an already finished cell.
    pub fn new(initial: Option<FrequencyPair>) -> Self {
        Self {
            inner: AtomicU64::new(initial.map_or(FINISHED, pack)),
        }
    }

    /// Starts on the first tone, or finished if the sequence is empty.
    pub fn for_sequence(sequence: &Sequence) -> Self {
        Self::new(sequence.first().map(|x| x.pair()))
    }

    pub fn set(&self, pair: FrequencyPair) {
        self.inner.store(pack(pair), Ordering::Release);
    }

    pub fn finish(&self) {
        self.inner.store(FINISHED, Ordering::Release);
    }

    /// The current pair, or `None` once finished.
    pub fn get(&self) -> Option<FrequencyPair> {
        match self.inner.load(Ordering::Acquire) {
            FINISHED => None,
            x => Some(unpack(x)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.get().is_none()
    }
}

fn pack(pair: FrequencyPair) -> u64 {
    (pair.melody.to_bits() as u64) << 32 | pair.bass.to_bits() as u64
}

fn unpack(word: u64) -> FrequencyPair {
    FrequencyPair::new(f32::from_bits((word >> 32) as u32), f32::from_bits(word as u32))
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use super::FrequencyCell;
    use crate::audio::{sequence::Sequence, tone::FrequencyPair};

    #[test]
    fn test_cell_states() {
        let cell = FrequencyCell::for_sequence(&Sequence::demo());
        assert_eq!(cell.get(), Some(FrequencyPair::new(262.0, 65.0)));

        cell.set(FrequencyPair::new(523.25, 0.0));
        assert_eq!(cell.get(), Some(FrequencyPair::new(523.25, 0.0)));

        cell.finish();
        assert!(cell.is_finished());
        assert!(FrequencyCell::for_sequence(&Sequence::new()).is_finished());
    }

    #[test]
    fn test_cell_never_tears() {
        // Every pair written has bass == melody / 4, a torn read would break that.
        let cell = Arc::new(FrequencyCell::new(Some(FrequencyPair::new(400.0, 100.0))));
        let writer = {
            let cell = cell.clone();
            thread::spawn(move || {
                for i in 1..50_000 {
                    let melody = i as f32 * 4.0;
                    cell.set(FrequencyPair::new(melody, melody / 4.0));
                }
                cell.finish();
            })
        };

        while let Some(pair) = cell.get() {
            assert_eq!(pair.melody / 4.0, pair.bass);
        }
        writer.join().unwrap();
    }
}
