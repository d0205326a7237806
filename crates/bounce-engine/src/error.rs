//! Render error types.

use alloc::string::String;

/// Error type for a render call.
///
/// Any error aborts the render as a whole; no partial output is completed
/// and nothing is retried.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderError {
    /// Pitch ratio was zero or negative (log2 quantization is undefined).
    InvalidPitch(f64),
    /// A segment referenced a waveform that is not in the bank.
    UnknownWaveform,
    /// The external pitch shifter failed.
    Shift(String),
}

impl core::fmt::Display for RenderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RenderError::InvalidPitch(ratio) => {
                write!(f, "pitch ratio must be positive, got {}", ratio)
            }
            RenderError::UnknownWaveform => write!(f, "segment references unknown waveform"),
            RenderError::Shift(msg) => write!(f, "pitch shifter failed: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RenderError {}
