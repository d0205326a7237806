//! Parameter-addressed cache for pitch-corrected waveforms.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use bounce_ir::{WaveformBank, WaveformKey};

use crate::error::RenderError;

/// External pitch-correcting resampler.
///
/// Given interleaved samples and a pitch ratio, produces a new interleaved
/// sequence, possibly of a different length, shifted by that ratio. The
/// engine treats this as a black box; a failure aborts the render.
pub trait PitchShifter {
    fn shift(&mut self, samples: &[f32], ratio: f64) -> Result<Vec<f32>, String>;
}

/// Memoizes pitch-corrected waveforms, keyed by waveform identity and
/// quantized pitch ratio.
///
/// One cache instance is owned by one render call; entries are never evicted
/// while the render runs. Stored buffers live behind `Arc`, so references
/// handed out stay valid no matter how many entries are inserted later.
pub struct PitchCache {
    /// Quantization steps per semitone.
    precision: f64,
    entries: BTreeMap<(WaveformKey, i32), Arc<[f32]>>,
    /// Memo of raw ratio bits -> quantized value.
    quantized: BTreeMap<u64, i32>,
}

impl PitchCache {
    /// Create an empty cache with the given quantization precision.
    pub fn new(precision: f64) -> Self {
        Self {
            precision,
            entries: BTreeMap::new(),
            quantized: BTreeMap::new(),
        }
    }

    /// Number of resampled buffers held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no resampled buffer has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quantize a pitch ratio to fractional-semitone steps.
    ///
    /// Ratios that differ only by floating-point noise collapse to the same
    /// bucket, so they share one cache entry.
    pub fn quantize(&mut self, ratio: f64) -> i32 {
        let bits = ratio.to_bits();
        if let Some(&q) = self.quantized.get(&bits) {
            return q;
        }
        let q = libm::round(libm::log2(ratio) * 12.0 * self.precision) as i32;
        self.quantized.insert(bits, q);
        q
    }

    /// Resolve the effective waveform for `key` played at `ratio`.
    ///
    /// A ratio of exactly 1.0 passes the original buffer through with no
    /// cache interaction. Any other ratio is shifted at most once per
    /// `(waveform, quantized ratio)` pair; repeat calls return the stored
    /// buffer.
    pub fn resolve<S: PitchShifter>(
        &mut self,
        bank: &WaveformBank,
        key: WaveformKey,
        ratio: f64,
        shifter: &mut S,
    ) -> Result<Arc<[f32]>, RenderError> {
        let source = bank.get(key).ok_or(RenderError::UnknownWaveform)?;
        if ratio == 1.0 {
            return Ok(source.share());
        }
        if ratio <= 0.0 {
            return Err(RenderError::InvalidPitch(ratio));
        }

        let bucket = (key, self.quantize(ratio));
        if let Some(buffer) = self.entries.get(&bucket) {
            return Ok(buffer.clone());
        }

        let shifted = shifter
            .shift(source.samples(), ratio)
            .map_err(RenderError::Shift)?;
        let buffer: Arc<[f32]> = shifted.into();
        self.entries.insert(bucket, buffer.clone());
        Ok(buffer)
    }
}
