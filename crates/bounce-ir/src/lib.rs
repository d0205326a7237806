//! Core IR types for the bounce timeline renderer.
//!
//! This crate defines the data model shared across the workspace: waveform
//! storage, timeline segments with amplitude keyframes, and the song types
//! that format parsers emit. Format parsers produce a `Song`, the song is
//! lowered to a `Segment` list, and the engine renders the segments.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod segment;
mod song;
mod waveform;

pub use segment::{Keyframe, Segment};
pub use song::{Instrument, Note, RowTime, Song, SongInfo};
pub use waveform::{Waveform, WaveformBank, WaveformKey, CHANNELS};
