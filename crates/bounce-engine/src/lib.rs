//! Timeline render engine for bounce.
//!
//! Turns a list of time-stamped segments into one continuous multichannel
//! waveform: boundary events are walked in time order, every maximal region
//! with a constant active set is mixed sample by sample, and the result is
//! streamed out through a sink under a bounded-memory, single-pass contract.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod cache;
mod config;
mod error;
mod mixer;
mod note;
pub mod scheduler;
mod sink;

pub use cache::{PitchCache, PitchShifter};
pub use config::RenderConfig;
pub use error::RenderError;
pub use mixer::mix_region;
pub use note::{ActiveNote, EnvelopePoint};
pub use scheduler::render_timeline;
pub use sink::{AudioSink, MemorySink};
