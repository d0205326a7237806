//! Timeline segments and amplitude keyframes.

use alloc::vec::Vec;

use crate::song::{Instrument, Note};
use crate::waveform::{WaveformKey, CHANNELS};

/// A point in a segment's amplitude envelope.
///
/// Times are relative to the segment start. Keyframes describe interior
/// points only; the engine synthesizes the boundary points when a segment
/// becomes active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    /// Seconds since the segment start.
    pub time_seconds: f64,
    /// Per-channel amplitude at this point.
    pub amplitude: [f64; CHANNELS],
}

/// A time-bounded sound source instance on the render timeline.
#[derive(Clone, Debug)]
pub struct Segment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Rate at which the waveform is advanced; 1 => original tempo.
    pub tempo: f64,
    /// Pitch correction ratio applied to the waveform before playback;
    /// 1 => use the waveform unmodified.
    pub pitch: f64,
    /// Base per-channel gain.
    pub amplitude: [f64; CHANNELS],
    /// The source waveform in the caller's bank.
    pub waveform: WaveformKey,
    /// Interior envelope points, ascending in time (caller contract).
    pub keyframes: Vec<Keyframe>,
}

impl Segment {
    /// Create a segment playing `waveform` unmodified at unit gain.
    pub fn new(waveform: WaveformKey, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            start_seconds,
            end_seconds,
            tempo: 1.0,
            pitch: 1.0,
            amplitude: [1.0; CHANNELS],
            waveform,
            keyframes: Vec::new(),
        }
    }

    /// Build a segment from a parsed note and its instrument.
    ///
    /// The note's semitone offset plus the instrument tuning gives a raw
    /// pitch ratio. The playback tempo is the raw ratio below unity and its
    /// square root above, and the stored pitch is the remaining correction
    /// the resampler must apply (`raw / tempo`).
    pub fn from_note(note: &Note, instrument: &Instrument, bpm: f64, waveform: WaveformKey) -> Self {
        let semitones = note.pitch_semitones + instrument.tuning_semitones;
        let raw_pitch = libm::pow(2.0, semitones / 12.0);
        let tempo = if raw_pitch < 1.0 {
            raw_pitch
        } else {
            libm::sqrt(raw_pitch)
        };
        // The instrument's default volume is already folded into the note's
        // dB value by the parser; only the tuning applies here.
        let gain = libm::pow(10.0, note.amplitude_db / 20.0);

        Self {
            start_seconds: note.start.rows() * 60.0 / bpm,
            end_seconds: note.end.rows() * 60.0 / bpm,
            tempo,
            pitch: raw_pitch / tempo,
            amplitude: [gain; CHANNELS],
            waveform,
            keyframes: Vec::new(),
        }
    }

    /// Duration in seconds (negative for degenerate segments).
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Whether the segment occupies any time at all.
    ///
    /// Segments with `start >= end` are dropped before scheduling.
    pub fn is_playable(&self) -> bool {
        self.end_seconds > self.start_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::RowTime;
    use crate::waveform::{Waveform, WaveformBank};

    fn test_key() -> WaveformKey {
        let mut bank = WaveformBank::with_key();
        bank.insert(Waveform::from_mono(&[0.0]))
    }

    fn note(start_row: i32, end_row: i32, semitones: f64, db: f64) -> Note {
        Note {
            start: RowTime { abs_row: start_row, offset: 0.0 },
            end: RowTime { abs_row: end_row, offset: 0.0 },
            channel: 0,
            instrument: 0,
            pitch_semitones: semitones,
            amplitude_db: db,
        }
    }

    #[test]
    fn from_note_timing_follows_bpm() {
        let inst = Instrument::new(1, "test");
        let seg = Segment::from_note(&note(4, 8, 0.0, 0.0), &inst, 240.0, test_key());
        assert!((seg.start_seconds - 1.0).abs() < 1e-12);
        assert!((seg.end_seconds - 2.0).abs() < 1e-12);
    }

    #[test]
    fn from_note_octave_up_splits_pitch_and_tempo() {
        let inst = Instrument::new(1, "test");
        let seg = Segment::from_note(&note(0, 1, 12.0, 0.0), &inst, 240.0, test_key());
        // raw ratio 2.0: tempo takes sqrt(2), the resampler the rest
        assert!((seg.tempo - libm::sqrt(2.0)).abs() < 1e-12);
        assert!((seg.pitch * seg.tempo - 2.0).abs() < 1e-12);
    }

    #[test]
    fn from_note_octave_down_is_tempo_only() {
        let inst = Instrument::new(1, "test");
        let seg = Segment::from_note(&note(0, 1, -12.0, 0.0), &inst, 240.0, test_key());
        assert!((seg.tempo - 0.5).abs() < 1e-12);
        assert!((seg.pitch - 1.0).abs() < 1e-12);
    }

    #[test]
    fn from_note_applies_tuning_and_gain() {
        let mut inst = Instrument::new(1, "test");
        inst.tuning_semitones = 12.0;
        let seg = Segment::from_note(&note(0, 1, 0.0, -20.0), &inst, 240.0, test_key());
        assert!((seg.pitch * seg.tempo - 2.0).abs() < 1e-12);
        let expected = libm::pow(10.0, -20.0 / 20.0);
        assert!((seg.amplitude[0] - expected).abs() < 1e-12);
        assert_eq!(seg.amplitude[0], seg.amplitude[1]);
    }

    #[test]
    fn degenerate_segment_is_not_playable() {
        let key = test_key();
        assert!(!Segment::new(key, 1.0, 1.0).is_playable());
        assert!(!Segment::new(key, 2.0, 1.0).is_playable());
        assert!(Segment::new(key, 1.0, 2.0).is_playable());
    }
}
