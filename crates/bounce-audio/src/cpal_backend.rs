//! CPAL-based audio output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bounce_engine::AudioSink;
use bounce_ir::CHANNELS;

use crate::traits::{AudioError, AudioOutput};

/// CPAL-based audio output.
///
/// Rendered samples are pushed into a ring buffer; the device callback
/// drains it. Implements [`AudioSink`] with a blocking write, so the
/// renderer naturally throttles to playback speed.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    producer: HeapProd<f32>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Create a new CPAL output with the default device.
    pub fn new() -> Result<(Self, HeapCons<f32>), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // Force stereo output — the stream callback assumes 2-channel interleaving
        config.channels = CHANNELS as u16;

        // Ring buffer for audio data (about 100ms)
        let buffer_size = (config.sample_rate.0 as usize / 10) * CHANNELS;
        let rb = HeapRb::<f32>::new(buffer_size);
        let (producer, consumer) = rb.split();

        let output = Self {
            device,
            config,
            stream: None,
            producer,
            running: Arc::new(AtomicBool::new(false)),
        };

        Ok((output, consumer))
    }

    /// Build and start the audio stream.
    pub fn build_stream(&mut self, mut consumer: HeapCons<f32>) -> Result<(), AudioError> {
        let running = self.running.clone();

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        for sample in data.iter_mut() {
                            *sample = 0.0;
                        }
                        return;
                    }

                    // Underruns play silence rather than stale data
                    for sample in data.iter_mut() {
                        *sample = consumer.try_pop().unwrap_or(0.0);
                    }
                },
                |err| eprintln!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }

    /// Block until the device callback has consumed everything written.
    pub fn drain(&self) {
        while self.producer.occupied_len() > 0 {
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

impl AudioSink for CpalOutput {
    fn write(&mut self, samples: &[f32]) {
        for &sample in samples {
            // Spin until the ring buffer has room
            while self.producer.try_push(sample).is_err() {
                std::hint::spin_loop();
            }
        }
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream
                .pause()
                .map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}
