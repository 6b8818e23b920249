//! Pull-decoder contract
//!
//! A decoder is owned by exactly one sound instance and produces interleaved
//! 16-bit PCM on demand. Dispatch is on the asset's format tag; both
//! variants keep their own copy of the encoded payload.

use crate::audio::types::{SoundFormat, StreamInfo};
use crate::audio::vorbis::VorbisDecoder;
use crate::audio::wav::WavDecoder;
use crate::error::Result;
use std::sync::Arc;

/// Format-specific pull decoder.
///
/// # Contract
///
/// - `info` is valid immediately after open and constant thereafter.
/// - `decode` writes up to `max_frames` interleaved frames into `out` and
///   returns the number of frames produced. `0` means end of stream and
///   nothing else; stream corruption is an error, never a silent `0`.
/// - `rewind` resets the cursor to frame 0 (loop restart).
pub trait Decoder: Send {
    /// Stream metadata (channel count, sample rate).
    fn info(&self) -> StreamInfo;

    /// Decode up to `max_frames` frames of interleaved PCM into `out`.
    ///
    /// `out` must hold at least `max_frames * channels` samples; shorter
    /// slices bound the request instead of panicking.
    fn decode(&mut self, out: &mut [i16], max_frames: usize) -> Result<usize>;

    /// Reset the decode cursor to frame 0.
    fn rewind(&mut self) -> Result<()>;
}

/// Open a decoder for `format` over an owned copy of the encoded payload.
pub fn open_decoder(format: SoundFormat, bytes: Arc<[u8]>) -> Result<Box<dyn Decoder>> {
    match format {
        SoundFormat::Wav => Ok(Box::new(WavDecoder::open(bytes)?)),
        SoundFormat::OggVorbis => Ok(Box::new(VorbisDecoder::open(bytes)?)),
    }
}
