//! Event-driven timeline walk.
//!
//! Segment boundaries become a sorted event list; between consecutive events
//! the active set is constant, so each such region is mixed in one pass and
//! streamed to the sink.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use bounce_ir::{Segment, WaveformBank};

use crate::cache::{PitchCache, PitchShifter};
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::mixer::mix_region;
use crate::note::ActiveNote;
use crate::sink::AudioSink;

/// A segment turning on or off at a point in time.
#[derive(Clone, Copy, Debug)]
struct NoteEvent {
    time: f64,
    segment: usize,
    off: bool,
}

fn time_to_samples(seconds: f64, sample_rate: u32) -> i64 {
    libm::floor(seconds * sample_rate as f64) as i64
}

/// Render `segments` against `bank` into `sink` at `sample_rate`.
///
/// Runs in a single forward pass: all pitch-corrected waveforms are prepared
/// up front, then boundary events are walked in time order with ties broken
/// by segment order, on before off. Degenerate segments (end not after
/// start) never make it onto the timeline, and regions shorter than
/// `config.min_region_samples` produce no output while still advancing the
/// active set. Output accumulates in a pending buffer flushed to the sink
/// whenever it exceeds `config.flush_bytes`, plus one final flush.
pub fn render_timeline<S: PitchShifter, K: AudioSink>(
    segments: &[Segment],
    bank: &WaveformBank,
    sample_rate: u32,
    config: &RenderConfig,
    shifter: &mut S,
    sink: &mut K,
) -> Result<(), RenderError> {
    let mut cache = PitchCache::new(config.pitch_precision);

    // Prepare every distinct (waveform, pitch) pair before mixing starts,
    // so the walk below never stalls on the shifter.
    for segment in segments.iter().filter(|s| s.is_playable()) {
        cache.resolve(bank, segment.waveform, segment.pitch, shifter)?;
    }

    let mut events = Vec::with_capacity(segments.len() * 2);
    for (i, segment) in segments.iter().enumerate() {
        if !segment.is_playable() {
            continue;
        }
        events.push(NoteEvent {
            time: segment.start_seconds,
            segment: i,
            off: false,
        });
        events.push(NoteEvent {
            time: segment.end_seconds,
            segment: i,
            off: true,
        });
    }
    // Stable by construction: equal times keep push order, which is segment
    // order with each on preceding its own off.
    events.sort_by(|a, b| a.time.total_cmp(&b.time));

    let flush_samples = config.flush_bytes / core::mem::size_of::<f32>();
    let mut active: BTreeMap<usize, ActiveNote> = BTreeMap::new();
    let mut pending: Vec<f32> = Vec::new();

    for pair in events.windows(2) {
        let event = pair[0];
        if event.off {
            active.remove(&event.segment);
        } else {
            let segment = &segments[event.segment];
            let waveform = cache.resolve(bank, segment.waveform, segment.pitch, shifter)?;
            active.insert(
                event.segment,
                ActiveNote::new(segment, waveform, sample_rate),
            );
        }

        // Region starts are derived from absolute event times, not
        // accumulated, so float error cannot drift across the timeline.
        let cur = time_to_samples(event.time, sample_rate);
        let next = time_to_samples(pair[1].time, sample_rate);
        let duration = next - cur;
        if duration < config.min_region_samples {
            continue;
        }

        let mut notes: Vec<&mut ActiveNote> = active.values_mut().collect();
        mix_region(&mut notes, cur, duration, config.fade_samples, &mut pending);

        if pending.len() > flush_samples {
            sink.write(&pending);
            pending.clear();
        }
    }

    sink.write(&pending);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;
    use bounce_ir::{Waveform, WaveformKey, CHANNELS};

    use crate::sink::MemorySink;

    /// Identity shifter; pitch is not under test here.
    struct NullShifter;

    impl PitchShifter for NullShifter {
        fn shift(&mut self, samples: &[f32], _ratio: f64) -> Result<Vec<f32>, String> {
            Ok(samples.to_vec())
        }
    }

    fn bank_with_constant(frames: usize) -> (WaveformBank, WaveformKey) {
        let mut bank = WaveformBank::with_key();
        let key = bank.insert(Waveform::from_mono(&vec![1.0; frames]));
        (bank, key)
    }

    fn config_without_fades() -> RenderConfig {
        RenderConfig {
            fade_samples: 0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn overlapping_segments_produce_stepped_regions() {
        let (bank, key) = bank_with_constant(100);
        // A covers [0, 1), B covers [0.5, 1.5) at 100 Hz
        let segments = [Segment::new(key, 0.0, 1.0), Segment::new(key, 0.5, 1.5)];
        let mut sink = MemorySink::new();

        render_timeline(
            &segments,
            &bank,
            100,
            &config_without_fades(),
            &mut NullShifter,
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.samples.len(), 150 * CHANNELS);
        for frame in 0..150 {
            let expected = if (50..100).contains(&frame) { 2.0 } else { 1.0 };
            assert!(
                (sink.samples[frame * CHANNELS] - expected).abs() < 1e-6,
                "frame {}",
                frame
            );
        }
    }

    #[test]
    fn tiny_regions_are_dropped_without_shifting_time() {
        let (bank, key) = bank_with_constant(200);
        // the middle segment opens a 2-sample region at 100 Hz, below the
        // default 3-sample minimum
        let segments = [
            Segment::new(key, 0.0, 1.0),
            Segment::new(key, 0.5, 0.52),
            Segment::new(key, 1.0, 2.0),
        ];
        let mut sink = MemorySink::new();

        render_timeline(
            &segments,
            &bank,
            100,
            &config_without_fades(),
            &mut NullShifter,
            &mut sink,
        )
        .unwrap();

        // regions: [0,50) kept, [50,52) dropped, [52,100) kept, [100,200)
        // kept; the drop removes output but later regions keep their
        // absolute positions
        assert_eq!(sink.samples.len(), (50 + 48 + 100) * CHANNELS);
        let last = sink.samples.len() - CHANNELS;
        assert!((sink.samples[last] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_segments_are_ignored() {
        let (bank, key) = bank_with_constant(100);
        let segments = [
            Segment::new(key, 0.5, 0.5),
            Segment::new(key, 0.8, 0.2),
            Segment::new(key, 0.0, 0.5),
        ];
        let mut sink = MemorySink::new();

        render_timeline(
            &segments,
            &bank,
            100,
            &config_without_fades(),
            &mut NullShifter,
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.samples.len(), 50 * CHANNELS);
    }

    #[test]
    fn empty_timeline_still_flushes_once() {
        let bank = WaveformBank::with_key();
        let mut writes = 0usize;
        let mut sink = |chunk: &[f32]| {
            writes += 1;
            assert!(chunk.is_empty());
        };

        render_timeline(
            &[],
            &bank,
            44100,
            &RenderConfig::default(),
            &mut NullShifter,
            &mut sink,
        )
        .unwrap();

        assert_eq!(writes, 1);
    }

    #[test]
    fn long_renders_flush_in_bounded_chunks() {
        let (bank, key) = bank_with_constant(1000);
        // 40 back-to-back segments, each a 0.1 s region at 100 Hz
        let segments: Vec<Segment> = (0..40)
            .map(|i| Segment::new(key, i as f64 * 0.1, (i + 1) as f64 * 0.1))
            .collect();
        let config = RenderConfig {
            fade_samples: 0,
            flush_bytes: 256,
            ..RenderConfig::default()
        };
        // pending can exceed the threshold by at most one region
        let region_samples = 10 * CHANNELS;
        let limit = config.flush_bytes / core::mem::size_of::<f32>() + region_samples;

        let mut total = 0usize;
        let mut writes = 0usize;
        {
            let mut sink = |chunk: &[f32]| {
                total += chunk.len();
                writes += 1;
                assert!(chunk.len() <= limit);
            };
            render_timeline(&segments, &bank, 100, &config, &mut NullShifter, &mut sink)
                .unwrap();
        }

        assert_eq!(total, 400 * CHANNELS);
        assert!(writes > 1);
    }

    #[test]
    fn unknown_waveform_aborts_before_any_output() {
        let (_, key) = bank_with_constant(10);
        let empty_bank = WaveformBank::with_key();
        let segments = [Segment::new(key, 0.0, 1.0)];
        let mut sink = MemorySink::new();

        let err = render_timeline(
            &segments,
            &empty_bank,
            100,
            &RenderConfig::default(),
            &mut NullShifter,
            &mut sink,
        )
        .unwrap_err();

        assert_eq!(err, RenderError::UnknownWaveform);
        assert!(sink.samples.is_empty());
    }
}
