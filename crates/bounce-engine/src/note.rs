//! Resolved, render-time view of a segment.

use alloc::sync::Arc;
use alloc::vec::Vec;

use bounce_ir::{Segment, CHANNELS};

/// One point of a note's amplitude envelope, in absolute sample time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopePoint {
    pub time: i64,
    pub amplitude: [f64; CHANNELS],
}

/// A segment resolved for mixing: its pitch-corrected waveform, absolute
/// sample-index bounds, and a boundary-completed envelope.
///
/// Lives only as long as the segment is active on the timeline.
#[derive(Clone, Debug)]
pub struct ActiveNote {
    waveform: Arc<[f32]>,
    speed: f64,
    start_time: i64,
    end_time: i64,
    /// Envelope points, ascending in time. The first carries the segment's
    /// base amplitude at the note start, the last repeats the final
    /// amplitude at the note end.
    keyframes: Vec<EnvelopePoint>,
    /// Index of the current envelope interval; only ever moves forward.
    cursor: usize,
}

impl ActiveNote {
    /// Build a note from a segment and its resolved waveform.
    ///
    /// The end time is clamped so the note never claims more time than the
    /// resolved waveform can supply.
    pub fn new(segment: &Segment, waveform: Arc<[f32]>, sample_rate: u32) -> Self {
        let srate = sample_rate as f64;
        let start_time = libm::floor(segment.start_seconds * srate) as i64;
        let mut end_time = libm::floor(segment.end_seconds * srate) as i64;
        let frames = (waveform.len() / CHANNELS) as i64;
        if end_time > start_time + frames {
            end_time = start_time + frames;
        }

        let mut keyframes = Vec::with_capacity(segment.keyframes.len() + 2);
        keyframes.push(EnvelopePoint {
            time: start_time,
            amplitude: segment.amplitude,
        });
        for kf in &segment.keyframes {
            keyframes.push(EnvelopePoint {
                time: start_time + libm::floor(kf.time_seconds * srate) as i64,
                amplitude: kf.amplitude,
            });
        }
        let last = keyframes[keyframes.len() - 1].amplitude;
        keyframes.push(EnvelopePoint {
            time: end_time,
            amplitude: last,
        });

        Self {
            waveform,
            speed: segment.tempo,
            start_time,
            end_time,
            keyframes,
            cursor: 0,
        }
    }

    /// Absolute sample index at which the note starts.
    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Absolute sample index at which the note ends (clamped).
    pub fn end_time(&self) -> i64 {
        self.end_time
    }

    /// Waveform advance per output sample.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Number of frames in the resolved waveform.
    pub fn frames(&self) -> i64 {
        (self.waveform.len() / CHANNELS) as i64
    }

    /// The resolved interleaved sample data.
    pub fn waveform(&self) -> &[f32] {
        &self.waveform
    }

    /// Envelope amplitude at absolute sample time `t`, linearly interpolated
    /// between the bracketing keyframes.
    ///
    /// Sampling exactly at a keyframe's time yields that keyframe's
    /// amplitude. The cursor only moves forward, so callers must present
    /// non-decreasing values of `t`.
    pub fn envelope_at(&mut self, t: i64) -> [f64; CHANNELS] {
        while self.cursor + 1 < self.keyframes.len() && self.keyframes[self.cursor + 1].time <= t {
            self.cursor += 1;
        }
        let from = self.keyframes[self.cursor];
        if self.cursor + 1 == self.keyframes.len() || t <= from.time {
            return from.amplitude;
        }
        let to = self.keyframes[self.cursor + 1];
        let span = (to.time - from.time) as f64;
        // zero-length intervals evaluate at the interval start
        let u = if span > 0.0 {
            (t - from.time) as f64 / span
        } else {
            0.0
        };
        let mut amplitude = [0.0; CHANNELS];
        for (k, amp) in amplitude.iter_mut().enumerate() {
            *amp = (1.0 - u) * from.amplitude[k] + u * to.amplitude[k];
        }
        amplitude
    }
}
