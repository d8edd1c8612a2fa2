//! Side channel exposing the latest generated buffer.
//! Meant for meters and scopes, it is never read back into the audio path.

use parking_lot::Mutex;

#[derive(Default)]
pub struct WaveformTap {
    latest: Mutex<Vec<f32>>,
}

impl WaveformTap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored buffer.
    /// Called from the audio thread, so if a reader is holding the lock this buffer is just skipped.
    pub fn publish(&self, samples: &[f32]) {
        if let Some(mut latest) = self.latest.try_lock() {
            latest.clear();
            latest.extend_from_slice(samples);
        }
    }

    /// A copy of the last published buffer.
    pub fn latest(&self) -> Vec<f32> {
        self.latest.lock().clone()
    }

    /// Largest absolute sample of the last buffer.
    pub fn peak(&self) -> f32 {
        self.latest.lock().iter().fold(0.0, |a, &b| a.max(b.abs()))
    }

    /// Root mean square of the last buffer, zero if nothing was published.
    pub fn rms(&self) -> f32 {
        let latest = self.latest.lock();
        if latest.is_empty() {
            return 0.0;
        }

        (latest.iter().map(|x| x * x).sum::<f32>() / latest.len() as f32).sqrt()
    }
}
