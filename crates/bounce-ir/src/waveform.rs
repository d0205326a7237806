//! Waveform storage.

use alloc::sync::Arc;
use alloc::vec::Vec;

/// Number of interleaved channels in all in-memory sample data.
pub const CHANNELS: usize = 2;

slotmap::new_key_type! {
    /// Key for referencing waveforms in a `WaveformBank`.
    pub struct WaveformKey;
}

/// Bank of waveforms owned by the caller for a render's duration.
///
/// The key doubles as the waveform's identity for the engine's pitch cache,
/// so two bank entries with identical sample data are still distinct.
pub type WaveformBank = slotmap::SlotMap<WaveformKey, Waveform>;

/// An interleaved stereo sample buffer, values normalized to [-1.0, 1.0].
///
/// Samples are shared behind an `Arc` so resolved notes can hold onto the
/// buffer without copying and without tying their lifetime to the bank.
#[derive(Clone, Debug)]
pub struct Waveform {
    samples: Arc<[f32]>,
}

impl Waveform {
    /// Create a waveform from interleaved stereo samples.
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    /// Create a waveform from mono samples, duplicating each value to both
    /// channels.
    pub fn from_mono(samples: &[f32]) -> Self {
        let mut interleaved = Vec::with_capacity(samples.len() * CHANNELS);
        for &s in samples {
            for _ in 0..CHANNELS {
                interleaved.push(s);
            }
        }
        Self {
            samples: interleaved.into(),
        }
    }

    /// The interleaved sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// A shared handle to the sample data.
    pub fn share(&self) -> Arc<[f32]> {
        self.samples.clone()
    }

    /// Number of elements in the interleaved buffer.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the waveform has no data.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of multichannel frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mono_duplicates_channels() {
        let w = Waveform::from_mono(&[0.5, -0.25]);
        assert_eq!(w.samples(), &[0.5, 0.5, -0.25, -0.25]);
        assert_eq!(w.frames(), 2);
    }

    #[test]
    fn share_returns_same_buffer() {
        let w = Waveform::new(alloc::vec![0.0; 4]);
        let a = w.share();
        let b = w.share();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn bank_keys_are_distinct_for_equal_data() {
        let mut bank = WaveformBank::with_key();
        let a = bank.insert(Waveform::from_mono(&[1.0]));
        let b = bank.insert(Waveform::from_mono(&[1.0]));
        assert_ne!(a, b);
    }
}
