//! End-to-end render tests: song -> segments -> mixed samples -> WAV.

use bounce_ir::{Instrument, Note, RowTime, Song, SongInfo, Waveform, WaveformBank, CHANNELS};
use bounce_master::Controller;

fn note(row_start: i32, row_end: i32, semitones: f64) -> Note {
    Note {
        start: RowTime {
            abs_row: row_start,
            offset: 0.0,
        },
        end: RowTime {
            abs_row: row_end,
            offset: 0.0,
        },
        channel: 0,
        instrument: 0,
        pitch_semitones: semitones,
        amplitude_db: 0.0,
    }
}

/// One instrument holding a constant 0.5 waveform, playing `notes`.
fn controller_with_notes(notes: Vec<Note>) -> Controller {
    let mut bank = WaveformBank::with_key();
    let key = bank.insert(Waveform::from_mono(&[0.5; 4000]));
    let mut inst = Instrument::new(1, "const");
    inst.waveform = Some(key);
    let song = Song {
        info: SongInfo::new("fixture", 320.0),
        instruments: vec![inst],
        notes,
    };
    let mut ctrl = Controller::from_song(song, bank);
    ctrl.config_mut().fade_samples = 0;
    ctrl
}

#[test]
fn single_note_renders_at_waveform_level() {
    let ctrl = controller_with_notes(vec![note(0, 1, 0.0)]);

    // one row at 320 rows/min is 0.1875 s, 187 frames at 1 kHz
    let samples = ctrl.render(1000).unwrap();
    assert_eq!(samples.len(), 187 * CHANNELS);
    for &sample in &samples {
        assert!((sample - 0.5).abs() < 1e-6);
    }
}

#[test]
fn overlapping_notes_sum() {
    let mut notes = vec![note(0, 2, 0.0), note(1, 3, 0.0)];
    notes[1].channel = 1;
    let ctrl = controller_with_notes(notes);

    let samples = ctrl.render(1000).unwrap();
    // rows [0,3) = 0.5625 s = 562 frames
    assert_eq!(samples.len(), 562 * CHANNELS);
    // row 1 is covered by both notes
    let mid = 250 * CHANNELS;
    assert!((samples[mid] - 1.0).abs() < 1e-6);
    assert!((samples[0] - 0.5).abs() < 1e-6);
    let last = samples.len() - CHANNELS;
    assert!((samples[last] - 0.5).abs() < 1e-6);
}

#[test]
fn pitched_note_renders_through_the_resampler() {
    // +12 semitones: the waveform is resampled an octave up
    let ctrl = controller_with_notes(vec![note(0, 1, 12.0)]);

    let samples = ctrl.render(1000).unwrap();
    assert!(!samples.is_empty());
    for &sample in &samples {
        assert!(sample.is_finite());
        assert!(sample.abs() < 1.0);
    }
}

#[test]
fn duration_tracks_the_last_note() {
    let ctrl = controller_with_notes(vec![note(0, 1, 0.0), note(4, 8, 0.0)]);
    assert!((ctrl.duration_seconds() - 8.0 * 0.1875).abs() < 1e-12);
}

#[test]
fn empty_controller_renders_nothing() {
    let ctrl = Controller::new();
    assert_eq!(ctrl.render(44100).unwrap(), Vec::<f32>::new());
}

#[test]
fn wav_export_round_trips_through_a_file() {
    let ctrl = controller_with_notes(vec![note(0, 1, 0.0)]);
    let wav = ctrl.render_to_wav(1000).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    std::fs::write(&path, &wav).unwrap();
    let read_back = std::fs::read(&path).unwrap();

    assert_eq!(&read_back[0..4], b"RIFF");
    assert_eq!(&read_back[8..12], b"WAVE");
    // 187 stereo frames of i16 behind the 44-byte header
    assert_eq!(read_back.len(), 44 + 187 * CHANNELS * 2);
}
