//! Core audio data types
//!
//! Formats, stream metadata and the stereo frame type used throughout the
//! mix path.
//!
//! **Format conventions:**
//! - Decoders produce interleaved 16-bit PCM
//! - The mixer accumulates in f32 (-1.0 to 1.0), stereo interleaved
//! - Mono sources are duplicated to both channels at mix time

use serde::Deserialize;

/// Encoded format of a sound asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundFormat {
    /// Little-endian PCM inside a RIFF/WAVE container
    Wav,
    /// Vorbis-encoded audio inside an Ogg container
    OggVorbis,
}

impl std::fmt::Display for SoundFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoundFormat::Wav => write!(f, "wav"),
            SoundFormat::OggVorbis => write!(f, "ogg-vorbis"),
        }
    }
}

/// Stream metadata, constant for a decoder's lifetime.
///
/// Available immediately after a decoder is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Channel count (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// A single stereo sample (one frame of mixed audio).
///
/// Used for passing audio between the mixer and the output sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFrame {
    /// Left channel sample
    pub left: f32,

    /// Right channel sample
    pub right: f32,
}

impl AudioFrame {
    /// Create a silent frame (0.0, 0.0)
    pub fn zero() -> Self {
        AudioFrame {
            left: 0.0,
            right: 0.0,
        }
    }

    /// Create a frame from a mono sample (duplicated to both channels)
    pub fn from_mono(sample: f32) -> Self {
        AudioFrame {
            left: sample,
            right: sample,
        }
    }

    /// Create a frame from left and right samples
    pub fn from_stereo(left: f32, right: f32) -> Self {
        AudioFrame { left, right }
    }

    /// Add another frame to this frame (for mixing)
    pub fn add(&mut self, other: &AudioFrame) {
        self.left += other.left;
        self.right += other.right;
    }

    /// Clamp samples to [-1.0, 1.0] to prevent clipping
    pub fn clamp(&mut self) {
        self.left = self.left.clamp(-1.0, 1.0);
        self.right = self.right.clamp(-1.0, 1.0);
    }
}

/// Scale factor between 16-bit PCM and the f32 mix domain.
pub const I16_SCALE: f32 = 1.0 / 32768.0;
