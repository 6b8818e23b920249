//! Ogg Vorbis pull decoder
//!
//! Wraps symphonia's Ogg format reader and Vorbis codec behind the engine's
//! pull `Decoder` contract. Compressed packets are pulled on demand; decoded
//! samples that do not fit the caller's request are kept in a lookahead
//! queue and served first on the next call, so `decode` tolerates arbitrary
//! `max_frames` values.
//!
//! Stream metadata is taken from the codec parameters at open and is
//! constant for the stream's lifetime.

use crate::audio::decoder::Decoder;
use crate::audio::types::StreamInfo;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder as CodecDecoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Streaming Vorbis reader over an in-memory Ogg container.
///
/// Owns a reference-counted copy of the encoded bytes; rewinding reopens
/// the bitstream from the copy, so loop restarts never touch the sound
/// data entry the instance was created from.
pub struct VorbisDecoder {
    bytes: Arc<[u8]>,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn CodecDecoder>,
    track_id: u32,
    info: StreamInfo,
    /// Decoded but undelivered interleaved samples (whole frames only)
    pending: VecDeque<i16>,
    end_of_stream: bool,
}

impl VorbisDecoder {
    /// Probe the container, select the Vorbis track and read its metadata.
    pub fn open(bytes: Arc<[u8]>) -> Result<Self> {
        let (format, decoder, track_id, info) = open_stream(&bytes)?;
        Ok(Self {
            bytes,
            format,
            decoder,
            track_id,
            info,
            pending: VecDeque::new(),
            end_of_stream: false,
        })
    }

    /// Pull one packet from the container into the lookahead queue.
    ///
    /// Sets the end-of-stream flag when the container is out of packets.
    /// Decode failures surface as errors; they are never folded into
    /// end-of-stream.
    fn pull_packet(&mut self) -> Result<()> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    self.end_of_stream = true;
                    return Ok(());
                }
                Err(e) => {
                    return Err(Error::Decode(format!("failed to read packet: {}", e)));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = self
                .decoder
                .decode(&packet)
                .map_err(|e| Error::Decode(format!("vorbis decode failed: {}", e)))?;
            push_interleaved(&decoded, &mut self.pending)?;
            return Ok(());
        }
    }
}

impl Decoder for VorbisDecoder {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn decode(&mut self, out: &mut [i16], max_frames: usize) -> Result<usize> {
        let channels = self.info.channels as usize;
        let want = max_frames.min(out.len() / channels) * channels;

        let mut written = 0;
        while written < want {
            if let Some(sample) = self.pending.pop_front() {
                out[written] = sample;
                written += 1;
                continue;
            }
            if self.end_of_stream {
                break;
            }
            self.pull_packet()?;
        }

        Ok(written / channels)
    }

    fn rewind(&mut self) -> Result<()> {
        let (format, decoder, track_id, _) = open_stream(&self.bytes)?;
        self.format = format;
        self.decoder = decoder;
        self.track_id = track_id;
        self.pending.clear();
        self.end_of_stream = false;
        Ok(())
    }
}

/// Build reader + codec state for the Vorbis track of an Ogg payload.
fn open_stream(
    bytes: &Arc<[u8]>,
) -> Result<(Box<dyn FormatReader>, Box<dyn CodecDecoder>, u32, StreamInfo)> {
    let source = Cursor::new(Arc::clone(bytes));
    let stream = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("ogg");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::InvalidFormat(format!("failed to probe Ogg container: {}", e)))?;

    let format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::InvalidFormat("no audio track in Ogg container".into()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| Error::InvalidFormat("vorbis stream missing sample rate".into()))?;
    let channels = codec_params
        .channels
        .map(|c| c.count() as u16)
        .ok_or_else(|| Error::InvalidFormat("vorbis stream missing channel map".into()))?;
    if channels == 0 || channels > 2 {
        return Err(Error::InvalidFormat(format!(
            "unsupported vorbis channel count {}",
            channels
        )));
    }

    let decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::InvalidFormat(format!("failed to create vorbis decoder: {}", e)))?;

    Ok((
        format,
        decoder,
        track_id,
        StreamInfo {
            channels,
            sample_rate,
        },
    ))
}

/// Convert one decoded packet to interleaved 16-bit samples.
///
/// Vorbis decodes to planar f32; the integer arms cover other codecs the
/// Ogg reader could hand us.
fn push_interleaved(decoded: &AudioBufferRef<'_>, pending: &mut VecDeque<i16>) -> Result<()> {
    match decoded {
        AudioBufferRef::F32(buf) => {
            let channels = buf.spec().channels.count();
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    let sample = buf.chan(ch)[frame].clamp(-1.0, 1.0);
                    pending.push_back((sample * 32767.0) as i16);
                }
            }
            Ok(())
        }
        AudioBufferRef::S16(buf) => {
            let channels = buf.spec().channels.count();
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    pending.push_back(buf.chan(ch)[frame]);
                }
            }
            Ok(())
        }
        AudioBufferRef::S32(buf) => {
            let channels = buf.spec().channels.count();
            for frame in 0..buf.frames() {
                for ch in 0..channels {
                    pending.push_back((buf.chan(ch)[frame] >> 16) as i16);
                }
            }
            Ok(())
        }
        _ => Err(Error::Decode(
            "unsupported sample format in Ogg stream".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junk_bytes_rejected() {
        let junk: Vec<u8> = (0..255u8).cycle().take(4096).collect();
        let result = VorbisDecoder::open(Arc::from(junk.as_slice()));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn empty_payload_rejected() {
        let result = VorbisDecoder::open(Arc::from(&[][..]));
        assert!(result.is_err());
    }

    // Streamed decode against real Vorbis data is covered by the fixture
    // tests in tests/decoder_tests.rs.
}
