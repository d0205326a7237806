//! Rubato-backed pitch shifter.

use bounce_engine::PitchShifter;
use bounce_ir::CHANNELS;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

/// Pitch correction by polynomial resampling.
///
/// A pitch ratio of `r` maps to a resample ratio of `1/r`: raising the
/// pitch shortens the buffer, and the scheduler compensates by advancing
/// through it at the segment's tempo.
pub struct RubatoShifter;

impl RubatoShifter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RubatoShifter {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchShifter for RubatoShifter {
    fn shift(&mut self, samples: &[f32], ratio: f64) -> Result<Vec<f32>, String> {
        let planar = deinterleave(samples);
        let frames = planar[0].len();
        if frames == 0 {
            return Ok(Vec::new());
        }

        // One chunk covering the whole waveform; the ratio never changes
        let mut resampler =
            FastFixedIn::<f32>::new(1.0 / ratio, 1.0, PolynomialDegree::Septic, frames, CHANNELS)
                .map_err(|e| e.to_string())?;
        let shifted = resampler.process(&planar, None).map_err(|e| e.to_string())?;
        Ok(interleave(shifted))
    }
}

/// Split interleaved samples into per-channel buffers for rubato.
fn deinterleave(samples: &[f32]) -> Vec<Vec<f32>> {
    let frames = samples.len() / CHANNELS;
    let mut planar = vec![Vec::with_capacity(frames); CHANNELS];
    for frame in samples.chunks_exact(CHANNELS) {
        for (ch, &sample) in frame.iter().enumerate() {
            planar[ch].push(sample);
        }
    }
    planar
}

/// Merge per-channel buffers back into interleaved samples.
fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
    let frames = planar[0].len();
    let mut interleaved = Vec::with_capacity(frames * CHANNELS);
    for i in 0..frames {
        for channel in &planar {
            interleaved.push(channel[i]);
        }
    }
    interleaved
}
