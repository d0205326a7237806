//! Headless controller for bounce.
//!
//! Provides a unified API for loading modules, offline rendering, and
//! device playback that CLI frontends can share.

mod shift;
mod wav;

use bounce_audio::{AudioError, AudioOutput, CpalOutput};
use bounce_engine::{render_timeline, MemorySink, RenderConfig, RenderError};
use bounce_ir::{Segment, Song, SongInfo, WaveformBank};

// Re-export common types so callers don't need the lower crates directly.
pub use bounce_formats::FormatError;
pub use bounce_ir::CHANNELS;

pub use shift::RubatoShifter;
pub use wav::{samples_to_wav, write_wav};

/// Error type for playback through a device.
#[derive(Debug)]
pub enum PlayError {
    Audio(AudioError),
    Render(RenderError),
}

impl From<AudioError> for PlayError {
    fn from(e: AudioError) -> Self {
        PlayError::Audio(e)
    }
}

impl From<RenderError> for PlayError {
    fn from(e: RenderError) -> Self {
        PlayError::Render(e)
    }
}

impl std::fmt::Display for PlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayError::Audio(e) => write!(f, "{}", e),
            PlayError::Render(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PlayError {}

/// Headless controller — owns a song, its sample bank, and the lowered
/// segment timeline.
pub struct Controller {
    song: Song,
    bank: WaveformBank,
    segments: Vec<Segment>,
    config: RenderConfig,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            song: Song {
                info: SongInfo::new("Untitled", 320.0),
                instruments: Vec::new(),
                notes: Vec::new(),
            },
            bank: WaveformBank::with_key(),
            segments: Vec::new(),
            config: RenderConfig::default(),
        }
    }

    /// Build a controller from an already-assembled song and bank.
    pub fn from_song(song: Song, bank: WaveformBank) -> Self {
        let segments = song.to_segments();
        Self {
            song,
            bank,
            segments,
            config: RenderConfig::default(),
        }
    }

    // --- Song management ---

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    /// Timeline length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.end_seconds)
            .fold(0.0, f64::max)
    }

    pub fn load_mod(&mut self, data: &[u8]) -> Result<(), FormatError> {
        let mut bank = WaveformBank::with_key();
        let song = bounce_formats::load_mod(data, &mut bank)?;
        self.segments = song.to_segments();
        self.song = song;
        self.bank = bank;
        Ok(())
    }

    // --- Offline rendering ---

    /// Render the whole timeline to interleaved f32 samples.
    pub fn render(&self, sample_rate: u32) -> Result<Vec<f32>, RenderError> {
        let mut sink = MemorySink::new();
        let mut shifter = RubatoShifter::new();
        render_timeline(
            &self.segments,
            &self.bank,
            sample_rate,
            &self.config,
            &mut shifter,
            &mut sink,
        )?;
        Ok(sink.samples)
    }

    pub fn render_to_wav(&self, sample_rate: u32) -> Result<Vec<u8>, RenderError> {
        let samples = self.render(sample_rate)?;
        Ok(wav::samples_to_wav(&samples, sample_rate))
    }

    // --- Device playback ---

    /// Render straight into the default output device, blocking until the
    /// whole timeline has played out.
    pub fn play_blocking(&self) -> Result<(), PlayError> {
        let (mut output, consumer) = CpalOutput::new()?;
        output.build_stream(consumer)?;
        output.start()?;

        let sample_rate = output.sample_rate();
        let mut shifter = RubatoShifter::new();
        render_timeline(
            &self.segments,
            &self.bank,
            sample_rate,
            &self.config,
            &mut shifter,
            &mut output,
        )?;

        output.drain();
        output.stop()?;
        Ok(())
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
