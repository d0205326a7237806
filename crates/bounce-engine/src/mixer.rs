//! Per-sample additive mixing of one constant-active-set region.

use alloc::vec::Vec;

use bounce_ir::CHANNELS;

use crate::note::ActiveNote;

/// Linear fade factor near a note's boundaries.
///
/// `rel` is the sample offset from the note start, `rel_left` the count of
/// samples remaining before the note end. The rising and falling ramps are
/// independent scalings, so a note shorter than two fade windows gets their
/// product. With a clamped end time and a speed below one, `rel_left` can go
/// negative while the note is still in the active set; each ramp is clamped
/// to [0, 1].
fn edge_fade(rel: i64, rel_left: i64, fade_samples: i64) -> f64 {
    if fade_samples <= 0 {
        return 1.0;
    }
    let rise = (rel as f64 / fade_samples as f64).clamp(0.0, 1.0);
    let fall = (rel_left as f64 / fade_samples as f64).clamp(0.0, 1.0);
    rise * fall
}

/// Mix `count` frames starting at absolute sample time `region_start`,
/// appending interleaved f32 frames to `out`.
///
/// Every note in `notes` is assumed active for the whole region. Each output
/// sample sums, over all notes, the waveform sample addressed by the note's
/// speed, scaled by its envelope and a linear fade at the note edges.
/// Accumulation happens in f64; the sum is truncated to f32 only on append.
pub fn mix_region(
    notes: &mut [&mut ActiveNote],
    region_start: i64,
    count: i64,
    fade_samples: i64,
    out: &mut Vec<f32>,
) {
    for i in 0..count {
        let t = region_start + i;
        let mut acc = [0.0f64; CHANNELS];
        for note in notes.iter_mut() {
            let rel = t - note.start_time();
            if rel < 0 {
                continue;
            }
            let sample_time = libm::floor(rel as f64 * note.speed()) as i64;
            if sample_time < 0 || sample_time >= note.frames() {
                continue;
            }
            let rel_left = note.end_time() - t;
            let fade = edge_fade(rel, rel_left, fade_samples);
            let env = note.envelope_at(t);
            let base = sample_time as usize * CHANNELS;
            let waveform = note.waveform();
            for (k, acc_k) in acc.iter_mut().enumerate() {
                *acc_k += waveform[base + k] as f64 * env[k] * fade;
            }
        }
        for &sample in &acc {
            out.push(sample as f32);
        }
    }
}
