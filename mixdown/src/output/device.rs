//! Audio device adapter
//!
//! Bridges the caller-paced update loop to a cpal output stream. The two
//! sides never share mutable structures: mixed frames cross on a
//! single-producer single-consumer lock-free ring buffer, and the device
//! callback outputs silence (counting an underrun) when the ring is empty.
//!
//! This adapter is outside the playback core; the engine only sees the
//! `AudioSink` it produces.

use crate::audio::types::AudioFrame;
use crate::error::{Error, Result};
use crate::output::AudioSink;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use ringbuf::{traits::*, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Ring capacity in frames (~93ms at 44.1kHz): enough to ride out jitter
/// in the caller's update cadence without adding noticeable latency.
const DEFAULT_RING_FRAMES: usize = 4096;

/// Producer half: the engine's sink. Push failures mean the caller is
/// updating faster than the device drains; the frame is dropped and
/// counted.
pub struct DeviceSink {
    producer: ringbuf::HeapProd<AudioFrame>,
    overruns: Arc<AtomicU64>,
}

impl DeviceSink {
    /// Frames the device has not consumed yet.
    pub fn queued_frames(&self) -> usize {
        self.producer.occupied_len()
    }

    /// Ring capacity in frames.
    pub fn capacity(&self) -> usize {
        self.producer.capacity().into()
    }

    /// Total frames dropped because the ring was full.
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl AudioSink for DeviceSink {
    fn write(&mut self, frames: &[AudioFrame]) {
        for frame in frames {
            if self.producer.try_push(*frame).is_err() {
                let count = self.overruns.fetch_add(1, Ordering::Relaxed) + 1;
                if count % 1000 == 0 {
                    warn!("device ring overrun (total: {})", count);
                }
            }
        }
    }
}

/// Open output stream plus its callback-side counters.
///
/// Keep this alive for as long as audio should play; dropping it stops
/// the stream.
pub struct DeviceOutput {
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: u16,
    underruns: Arc<AtomicU64>,
}

impl DeviceOutput {
    /// Open the default output device and start the stream.
    ///
    /// Returns the running output plus the sink to hand to
    /// `SoundSystem::update`. Only f32 output devices are supported.
    pub fn open(ring_frames: Option<usize>) -> Result<(Self, DeviceSink)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::AudioOutput("no default output device".into()))?;

        let name = device.name().unwrap_or_else(|_| "unknown".into());
        info!("using audio device: {}", name);

        let supported = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("no output config: {}", e)))?;
        if supported.sample_format() != SampleFormat::F32 {
            return Err(Error::AudioOutput(format!(
                "unsupported device sample format {:?} (only f32)",
                supported.sample_format()
            )));
        }
        let config: StreamConfig = supported.config();
        let channels = config.channels;
        let sample_rate = config.sample_rate.0;

        debug!(
            "device config: {} Hz, {} channels, ring {} frames",
            sample_rate,
            channels,
            ring_frames.unwrap_or(DEFAULT_RING_FRAMES)
        );

        let ring = HeapRb::<AudioFrame>::new(ring_frames.unwrap_or(DEFAULT_RING_FRAMES));
        let (producer, mut consumer) = ring.split();

        let underruns = Arc::new(AtomicU64::new(0));
        let overruns = Arc::new(AtomicU64::new(0));
        let callback_underruns = Arc::clone(&underruns);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for out in data.chunks_mut(channels as usize) {
                        let frame = match consumer.try_pop() {
                            Some(frame) => frame,
                            None => {
                                // Silence keeps the device fed; the counter
                                // tells us how often we starved it
                                callback_underruns.fetch_add(1, Ordering::Relaxed);
                                AudioFrame::zero()
                            }
                        };
                        match out.len() {
                            1 => out[0] = 0.5 * (frame.left + frame.right),
                            _ => {
                                out[0] = frame.left;
                                out[1] = frame.right;
                                for extra in out.iter_mut().skip(2) {
                                    *extra = 0.0;
                                }
                            }
                        }
                    }
                },
                |e| error!("audio stream error: {}", e),
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("failed to start stream: {}", e)))?;

        Ok((
            Self {
                _stream: stream,
                sample_rate,
                channels,
                underruns,
            },
            DeviceSink { producer, overruns },
        ))
    }

    /// Device sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Device channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Callback pops that found the ring empty.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}
