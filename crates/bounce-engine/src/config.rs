//! Render configuration knobs.

/// Tunable parameters for one render call.
#[derive(Clone, Copy, Debug)]
pub struct RenderConfig {
    /// Pitch quantization steps per semitone used for cache bucket keys.
    pub pitch_precision: f64,
    /// Regions that quantize to fewer samples than this are skipped outright.
    pub min_region_samples: i64,
    /// Length in samples of the linear fade at segment boundaries.
    pub fade_samples: i64,
    /// Flush pending output to the sink once it exceeds this many bytes.
    pub flush_bytes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            // cent resolution
            pitch_precision: 100.0,
            min_region_samples: 3,
            fade_samples: 20,
            flush_bytes: 32 * 1024,
        }
    }
}
