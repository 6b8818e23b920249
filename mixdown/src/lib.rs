//! # mixdown
//!
//! Real-time audio playback engine: decodes WAV and Ogg Vorbis assets,
//! mixes any number of concurrently playing instances through a fixed
//! pool of PCM buffers, and hands the mixed output to a sink once per
//! caller-paced update, counting buffer underflow instead of hiding it.
//!
//! **Architecture:** pull-driven single-threaded core (decode-ahead →
//! mix → retire) behind generation-checked handles, with a lock-free
//! ring handoff to the audio device at the boundary.

pub mod audio;
pub mod config;
pub mod error;
pub mod output;
pub mod playback;

pub use audio::{AudioFrame, SoundFormat, StreamInfo};
pub use config::SystemConfig;
pub use error::{Error, Result};
pub use output::{AudioSink, CaptureSink, NullSink};
pub use playback::{PlayState, SoundDataHandle, SoundInstanceHandle, SoundStats, SoundSystem};
