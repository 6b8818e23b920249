//! Output sink boundary
//!
//! The engine's only obligation to the platform is to hand over mixed PCM
//! once per update. `AudioSink` is that contract; the device adapter in
//! [`device`] implements it against a real output stream, and the sinks
//! here cover tests and headless use.

pub mod device;

use crate::audio::types::AudioFrame;

pub use device::{DeviceOutput, DeviceSink};

/// Consumer of mixed PCM, one update's worth per call.
pub trait AudioSink {
    /// Accept `frames` of interleaved stereo output. Must not block.
    fn write(&mut self, frames: &[AudioFrame]);
}

/// Discards everything. For benchmarks and headless updates.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn write(&mut self, _frames: &[AudioFrame]) {}
}

/// Accumulates every mixed frame for inspection.
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub frames: Vec<AudioFrame>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest absolute sample seen on either channel.
    pub fn peak(&self) -> f32 {
        self.frames
            .iter()
            .map(|f| f.left.abs().max(f.right.abs()))
            .fold(0.0, f32::max)
    }
}

impl AudioSink for CaptureSink {
    fn write(&mut self, frames: &[AudioFrame]) {
        self.frames.extend_from_slice(frames);
    }
}
