//! Song types emitted by format parsers.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::segment::Segment;
use crate::waveform::WaveformKey;

/// Song metadata read from a module file.
#[derive(Clone, Debug)]
pub struct SongInfo {
    pub name: ArrayString<20>,
    /// Rows per minute.
    pub bpm: f64,
}

impl SongInfo {
    /// Create song info, truncating the name if needed.
    pub fn new(name: &str, bpm: f64) -> Self {
        let mut info = Self {
            name: ArrayString::new(),
            bpm,
        };
        let _ = info.name.try_push_str(name);
        info
    }

    /// Duration of one row in seconds.
    pub fn row_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }
}

/// A position in a song's row grid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowTime {
    /// Rows since the beginning of the song.
    pub abs_row: i32,
    /// Timing offset within the row, from 0 to 1.
    pub offset: f64,
}

impl RowTime {
    /// Position in fractional rows.
    pub fn rows(&self) -> f64 {
        self.abs_row as f64 + self.offset
    }
}

/// One note from a module file.
#[derive(Clone, Debug)]
pub struct Note {
    pub start: RowTime,
    pub end: RowTime,
    /// Module channel the note was read from.
    pub channel: usize,
    /// Index into the song's instrument list.
    pub instrument: usize,
    /// Semitones relative to the instrument's sample; 0 plays the sample at
    /// its original pitch.
    pub pitch_semitones: f64,
    /// Amplitude in dB; 0 is the default amplitude.
    pub amplitude_db: f64,
}

impl Note {
    /// Duration in rows.
    pub fn duration_rows(&self) -> f64 {
        self.end.rows() - self.start.rows()
    }
}

/// An instrument or sample definition from a module file.
#[derive(Clone, Debug)]
pub struct Instrument {
    pub id: usize,
    pub name: ArrayString<22>,
    /// Added to the semitones of every note played with this instrument.
    pub tuning_semitones: f64,
    /// Default amplitude in dB, folded into notes by the parser.
    pub amplitude_db: f64,
    /// Sample data in the caller's bank; `None` for empty instruments.
    pub waveform: Option<WaveformKey>,
}

impl Instrument {
    /// Create an empty instrument, truncating the name if needed.
    pub fn new(id: usize, name: &str) -> Self {
        let mut inst = Self {
            id,
            name: ArrayString::new(),
            tuning_semitones: 0.0,
            amplitude_db: 0.0,
            waveform: None,
        };
        let _ = inst.name.try_push_str(name);
        inst
    }
}

/// A parsed song: metadata, instruments, and the note list.
#[derive(Clone, Debug)]
pub struct Song {
    pub info: SongInfo,
    pub instruments: Vec<Instrument>,
    pub notes: Vec<Note>,
}

impl Song {
    /// Lower the note list to renderable segments.
    ///
    /// Notes that reference a missing instrument or an instrument without
    /// sample data are skipped.
    pub fn to_segments(&self) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            let Some(instrument) = self.instruments.get(note.instrument) else {
                continue;
            };
            let Some(waveform) = instrument.waveform else {
                continue;
            };
            segments.push(Segment::from_note(note, instrument, self.info.bpm, waveform));
        }
        segments
    }
}
