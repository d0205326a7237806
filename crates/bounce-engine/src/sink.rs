//! Output sinks for rendered sample data.

use alloc::vec::Vec;

/// Consumer of interleaved f32 sample chunks.
///
/// The scheduler calls `write` with variably sized chunks as its pending
/// buffer fills, and once more at the end of the render (possibly with an
/// empty slice). Implementations are free to block.
pub trait AudioSink {
    fn write(&mut self, samples: &[f32]);
}

impl<F: FnMut(&[f32])> AudioSink for F {
    fn write(&mut self, samples: &[f32]) {
        self(samples)
    }
}

/// Sink that accumulates everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub samples: Vec<f32>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for MemorySink {
    fn write(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_concatenates_chunks() {
        let mut sink = MemorySink::new();
        sink.write(&[1.0, 2.0]);
        sink.write(&[]);
        sink.write(&[3.0]);
        assert_eq!(sink.samples, alloc::vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn closures_are_sinks() {
        let mut total = 0usize;
        {
            let mut sink = |chunk: &[f32]| total += chunk.len();
            AudioSink::write(&mut sink, &[0.0; 7]);
            AudioSink::write(&mut sink, &[0.0; 3]);
        }
        assert_eq!(total, 10);
    }
}
