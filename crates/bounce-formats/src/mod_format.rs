//! ProTracker MOD format parser.
//!
//! Emits a flat note list rather than pattern data: every cell with a
//! period becomes a note one row long, and empty rows on the same channel
//! extend the previous note until a new note or a note-off cuts it.

use alloc::string::String;
use alloc::vec::Vec;

use bounce_ir::{Instrument, Note, RowTime, Song, SongInfo, Waveform, WaveformBank};

use crate::FormatError;

const HEADER_BYTES: usize = 1084;
const PATTERN_ROWS: usize = 64;
/// Looped samples are unrolled until they reach this many frames.
const MIN_LOOPED_FRAMES: usize = 8 * 1024;
/// Rows per minute; MOD playback timing is fixed for our purposes.
const MOD_BPM: f64 = 320.0;

/// Load a MOD file from bytes, inserting sample data into `bank`.
pub fn load_mod(data: &[u8], bank: &mut WaveformBank) -> Result<Song, FormatError> {
    if data.len() < HEADER_BYTES {
        return Err(FormatError::UnexpectedEof);
    }

    let info = SongInfo::new(&parse_string(&data[0..20]), MOD_BPM);

    // 31 sample headers at offset 20, 30 bytes each
    let mut headers = Vec::with_capacity(31);
    let mut instruments = Vec::with_capacity(31);
    for i in 0..31 {
        let offset = 20 + i * 30;
        let header = SampleHeader::parse(&data[offset..offset + 30]);

        let mut inst = Instrument::new(i + 1, &parse_string(&data[offset..offset + 22]));
        inst.tuning_semitones = header.finetune as f64 / 8.0;
        inst.amplitude_db = header.volume_db();
        instruments.push(inst);
        headers.push(header);
    }

    let song_length = (data[950] as usize).min(128);
    let seq_table = &data[952..952 + 128];

    let channels = channels_from_signature(&data[1080..1084])?;

    let num_patterns = seq_table.iter().map(|&p| p as usize + 1).max().unwrap_or(0);
    let pattern_bytes = PATTERN_ROWS * channels * 4;
    if data.len() < HEADER_BYTES + pattern_bytes * num_patterns {
        return Err(FormatError::UnexpectedEof);
    }

    // Walk the sequence table, accumulating notes. Held notes survive
    // pattern boundaries.
    let mut notes = Vec::new();
    let mut state = PlayerState::new(channels, &instruments);
    for &pattern in &seq_table[..song_length] {
        let offset = HEADER_BYTES + pattern_bytes * pattern as usize;
        state.parse_pattern(&data[offset..offset + pattern_bytes], &mut notes);
    }

    // Sample data follows the last pattern
    let mut sample_start = HEADER_BYTES + pattern_bytes * num_patterns;
    for (header, inst) in headers.iter().zip(instruments.iter_mut()) {
        if header.frames == 0 {
            continue;
        }
        let sample_end = sample_start + header.frames;
        if sample_end > data.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let mut samples: Vec<f32> = data[sample_start..sample_end]
            .iter()
            .map(|&b| b as i8 as f32 / 127.0)
            .collect();
        sample_start = sample_end;

        extend_looped(&mut samples, header.loop_start, header.loop_len);
        inst.waveform = Some(bank.insert(Waveform::from_mono(&samples)));
    }

    Ok(Song {
        info,
        instruments,
        notes,
    })
}

/// Unroll a sample's loop region until the buffer is long enough to cover
/// typical note durations.
fn extend_looped(samples: &mut Vec<f32>, loop_start: usize, loop_len: usize) {
    if loop_len == 0 || loop_start >= samples.len() {
        return;
    }
    while samples.len() < MIN_LOOPED_FRAMES {
        let end = (loop_start + loop_len).min(samples.len());
        if end == loop_start {
            return;
        }
        samples.extend_from_within(loop_start..end);
    }
}

/// Read a fixed-width, NUL-padded string field.
fn parse_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

fn channels_from_signature(sig: &[u8]) -> Result<usize, FormatError> {
    match sig {
        b"M.K." | b"M!K!" | b"FLT4" => Ok(4),
        b"6CHN" => Ok(6),
        b"8CHN" | b"FLT8" | b"CD81" | b"OKTA" | b"OCTA" => Ok(8),
        b"TDZ1" => Ok(1),
        b"TDZ2" => Ok(2),
        b"TDZ3" => Ok(3),
        // a zero channel count would make rows empty; treat it as a bad header
        [d, b'C', b'H', b'N'] if (b'1'..=b'9').contains(d) => Ok((d - b'0') as usize),
        [d1, d2, b'C', b'H'] | [d1, d2, b'C', b'N']
            if d1.is_ascii_digit() && d2.is_ascii_digit() =>
        {
            match ((d1 - b'0') as usize) * 10 + (d2 - b'0') as usize {
                0 => Err(FormatError::InvalidHeader),
                n => Ok(n),
            }
        }
        _ => Err(FormatError::InvalidHeader),
    }
}

/// One parsed 30-byte sample header.
struct SampleHeader {
    frames: usize,
    finetune: i8,
    volume: u8,
    loop_start: usize,
    loop_len: usize,
}

impl SampleHeader {
    fn parse(data: &[u8]) -> Self {
        // finetune is a signed nibble stored in a full byte
        let finetune = ((data[24] << 4) as i8) >> 4;
        Self {
            frames: u16::from_be_bytes([data[22], data[23]]) as usize * 2,
            finetune,
            volume: data[25],
            loop_start: u16::from_be_bytes([data[26], data[27]]) as usize * 2,
            loop_len: u16::from_be_bytes([data[28], data[29]]) as usize * 2,
        }
    }

    /// Default volume in dB. Volume 0 is treated as "unset" and plays at
    /// full scale, matching how most modules use it.
    fn volume_db(&self) -> f64 {
        if self.volume == 0 {
            0.0
        } else {
            libm::log10(self.volume as f64 / 64.0) * 10.0
        }
    }
}

/// Per-channel note tracking while walking the sequence.
struct PlayerState<'a> {
    channels: usize,
    abs_row: i32,
    /// Index into the output note list of the note still held per channel.
    held: Vec<Option<usize>>,
    instruments: &'a [Instrument],
}

impl<'a> PlayerState<'a> {
    fn new(channels: usize, instruments: &'a [Instrument]) -> Self {
        Self {
            channels,
            abs_row: 0,
            held: alloc::vec![None; channels],
            instruments,
        }
    }

    fn parse_pattern(&mut self, data: &[u8], notes: &mut Vec<Note>) {
        let row_bytes = self.channels * 4;
        for row in data.chunks_exact(row_bytes).take(PATTERN_ROWS) {
            let mut pattern_break = false;
            for (channel, cell) in row.chunks_exact(4).enumerate() {
                pattern_break |= self.parse_cell(cell, channel, notes);
            }
            self.abs_row += 1;
            if pattern_break {
                break;
            }
        }
        // Notes still sounding stretch to wherever this pattern stopped
        for held in &self.held {
            if let Some(i) = *held {
                notes[i].end = RowTime {
                    abs_row: self.abs_row,
                    offset: 0.0,
                };
            }
        }
    }

    /// Parse one 4-byte cell; returns true on a pattern break.
    fn parse_cell(&mut self, cell: &[u8], channel: usize, notes: &mut Vec<Note>) -> bool {
        // byte 0: instrument high nibble | period bits 8..11
        // byte 1: period bits 0..7
        // byte 2: instrument low nibble | effect command
        // byte 3: effect parameter
        let instrument_id = ((cell[0] & 0xF0) | (cell[2] >> 4)) as usize;
        let period = (((cell[0] & 0x0F) as u32) << 8) | cell[1] as u32;
        let effect = (((cell[2] & 0x0F) as u32) << 8) | cell[3] as u32;

        if effect == 0xC00 {
            self.held[channel] = None;
            return false;
        }
        if period > 0 {
            let semitones = libm::log2(856.0 / period as f64) * 12.0;
            let instrument = instrument_id.saturating_sub(1).min(self.instruments.len() - 1);
            let db = if (effect & 0xF00) == 0xC00 {
                libm::log10((effect & 0xFF) as f64 / 64.0) * 10.0
            } else {
                self.instruments[instrument].amplitude_db
            };
            self.held[channel] = Some(notes.len());
            notes.push(Note {
                start: RowTime {
                    abs_row: self.abs_row,
                    offset: 0.0,
                },
                end: RowTime {
                    abs_row: self.abs_row + 1,
                    offset: 0.0,
                },
                channel,
                instrument,
                pitch_semitones: semitones,
                amplitude_db: db,
            });
        } else if let Some(i) = self.held[channel] {
            notes[i].end = RowTime {
                abs_row: self.abs_row + 1,
                offset: 0.0,
            };
        }
        effect == 0xD00
    }
}
