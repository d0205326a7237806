//! Format parsers for bounce.
//!
//! Parses ProTracker MOD files into the song IR.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod mod_format;

pub use mod_format::load_mod;

/// Error type for format parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
}

impl core::fmt::Display for FormatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid file header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}
