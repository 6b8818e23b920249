//! WAV pull decoder
//!
//! Minimal RIFF/WAVE reader: validates the header once, then serves the
//! `data` chunk as interleaved 16-bit PCM with a bounded copy per call.
//! After a successful open, `decode` cannot fail.
//!
//! Supported payloads: PCM (format tag 1), mono or stereo, 8-bit or 16-bit
//! little-endian samples.

use crate::audio::decoder::Decoder;
use crate::audio::types::StreamInfo;
use crate::error::{Error, Result};
use std::sync::Arc;

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const FMT_CHUNK: &[u8; 4] = b"fmt ";
const DATA_CHUNK: &[u8; 4] = b"data";

/// PCM format tag in the `fmt ` chunk.
const WAVE_FORMAT_PCM: u16 = 1;

/// Sequential reader over the PCM payload of a WAV asset.
///
/// Holds its own reference-counted copy of the encoded bytes, so the owning
/// sound data payload can be replaced without disturbing an open decoder.
pub struct WavDecoder {
    bytes: Arc<[u8]>,
    info: StreamInfo,
    bits_per_sample: u16,
    data_start: usize,
    total_frames: usize,
    cursor_frames: usize,
}

impl WavDecoder {
    /// Validate the container header and locate the PCM payload.
    pub fn open(bytes: Arc<[u8]>) -> Result<Self> {
        let header = WavHeader::parse(&bytes)?;

        Ok(Self {
            bytes,
            info: StreamInfo {
                channels: header.channels,
                sample_rate: header.sample_rate,
            },
            bits_per_sample: header.bits_per_sample,
            data_start: header.data_start,
            total_frames: header.total_frames,
            cursor_frames: 0,
        })
    }

    fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }
}

impl Decoder for WavDecoder {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn decode(&mut self, out: &mut [i16], max_frames: usize) -> Result<usize> {
        let channels = self.info.channels as usize;
        let remaining = self.total_frames - self.cursor_frames;
        let frames = max_frames.min(remaining).min(out.len() / channels);
        if frames == 0 {
            return Ok(0);
        }

        let bytes_per_frame = channels * self.bytes_per_sample();
        let start = self.data_start + self.cursor_frames * bytes_per_frame;
        let src = &self.bytes[start..start + frames * bytes_per_frame];

        match self.bits_per_sample {
            16 => {
                for (i, pair) in src.chunks_exact(2).enumerate() {
                    out[i] = i16::from_le_bytes([pair[0], pair[1]]);
                }
            }
            8 => {
                // 8-bit WAV is unsigned, centered on 128
                for (i, byte) in src.iter().enumerate() {
                    out[i] = (*byte as i16 - 128) << 8;
                }
            }
            // Rejected at open
            _ => unreachable!("unsupported bit depth survived header validation"),
        }

        self.cursor_frames += frames;
        Ok(frames)
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor_frames = 0;
        Ok(())
    }
}

/// Little-endian reads; callers bound-check the containing chunk first.
fn read_u16_le(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32_le(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parsed and validated `fmt ` + `data` layout.
struct WavHeader {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data_start: usize,
    total_frames: usize,
}

impl WavHeader {
    fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 {
            return Err(Error::InvalidFormat("WAV header truncated".into()));
        }
        if &bytes[0..4] != RIFF_MAGIC || &bytes[8..12] != WAVE_MAGIC {
            return Err(Error::InvalidFormat("not a RIFF/WAVE container".into()));
        }

        let mut fmt: Option<(u16, u32, u16, u16)> = None;
        let mut data: Option<(usize, usize)> = None;

        // Chunk walk; chunks are word-aligned
        let mut offset = 12;
        while offset + 8 <= bytes.len() {
            let id = &bytes[offset..offset + 4];
            let size = read_u32_le(bytes, offset + 4) as usize;
            let body = offset + 8;

            if id == FMT_CHUNK {
                if size < 16 || body + 16 > bytes.len() {
                    return Err(Error::InvalidFormat("fmt chunk truncated".into()));
                }
                let audio_format = read_u16_le(bytes, body);
                let channels = read_u16_le(bytes, body + 2);
                let sample_rate = read_u32_le(bytes, body + 4);
                let block_align = read_u16_le(bytes, body + 12);
                let bits_per_sample = read_u16_le(bytes, body + 14);
                fmt = Some((audio_format, sample_rate, channels, bits_per_sample));

                if block_align as usize != channels as usize * bits_per_sample as usize / 8 {
                    return Err(Error::InvalidFormat(format!(
                        "inconsistent block alignment: {}",
                        block_align
                    )));
                }
            } else if id == DATA_CHUNK {
                // Tolerate a declared size past the end of the buffer by
                // clipping to what is actually present
                let len = size.min(bytes.len().saturating_sub(body));
                data = Some((body, len));
            }

            offset = body + size + (size & 1);
        }

        let (audio_format, sample_rate, channels, bits_per_sample) =
            fmt.ok_or_else(|| Error::InvalidFormat("missing fmt chunk".into()))?;
        let (data_start, data_len) =
            data.ok_or_else(|| Error::InvalidFormat("missing data chunk".into()))?;

        if audio_format != WAVE_FORMAT_PCM {
            return Err(Error::InvalidFormat(format!(
                "unsupported WAV format tag {} (only PCM)",
                audio_format
            )));
        }
        if channels == 0 || channels > 2 {
            return Err(Error::InvalidFormat(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        if bits_per_sample != 8 && bits_per_sample != 16 {
            return Err(Error::InvalidFormat(format!(
                "unsupported bit depth {}",
                bits_per_sample
            )));
        }
        if sample_rate == 0 {
            return Err(Error::InvalidFormat("zero sample rate".into()));
        }

        let bytes_per_frame = channels as usize * bits_per_sample as usize / 8;
        Ok(Self {
            channels,
            sample_rate,
            bits_per_sample,
            data_start,
            total_frames: data_len / bytes_per_frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::io::Cursor;

    fn wav_bytes(channels: u16, sample_rate: u32, frames: usize) -> Arc<[u8]> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..frames * channels as usize {
                writer.write_sample((i % 100) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        Arc::from(cursor.into_inner().as_slice())
    }

    #[test]
    fn open_reads_metadata() {
        let decoder = WavDecoder::open(wav_bytes(2, 44_100, 100)).unwrap();
        let info = decoder.info();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 44_100);
        assert_eq!(decoder.total_frames, 100);
    }

    #[test]
    fn decode_is_bounded_copy() {
        let mut decoder = WavDecoder::open(wav_bytes(2, 44_100, 100)).unwrap();
        let mut out = vec![0i16; 64 * 2];

        let n = decoder.decode(&mut out, 64).unwrap();
        assert_eq!(n, 64);
        let n = decoder.decode(&mut out, 64).unwrap();
        assert_eq!(n, 36);
        // End of stream, and it stays there
        assert_eq!(decoder.decode(&mut out, 64).unwrap(), 0);
        assert_eq!(decoder.decode(&mut out, 64).unwrap(), 0);
    }

    #[test]
    fn rewind_restarts_at_frame_zero() {
        let mut decoder = WavDecoder::open(wav_bytes(1, 22_050, 50)).unwrap();
        let mut out = vec![0i16; 50];
        assert_eq!(decoder.decode(&mut out, 50).unwrap(), 50);
        let first = out.clone();

        decoder.rewind().unwrap();
        assert_eq!(decoder.decode(&mut out, 50).unwrap(), 50);
        assert_eq!(out, first);
    }

    #[test]
    fn truncated_header_rejected() {
        assert!(matches!(
            WavDecoder::open(Arc::from(&b"RIFF"[..])),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn garbage_rejected() {
        let junk: Vec<u8> = (0..64u8).collect();
        assert!(WavDecoder::open(Arc::from(junk.as_slice())).is_err());
    }

    #[test]
    fn float_wav_rejected() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..64 {
                writer.write_sample(0.5f32).unwrap();
                writer.write_sample(-0.5f32).unwrap();
            }
            writer.finalize().unwrap();
        }
        let bytes: Arc<[u8]> = Arc::from(cursor.into_inner().as_slice());
        assert!(matches!(
            WavDecoder::open(bytes),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn eight_bit_wav_decodes() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 8,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            // hound takes 8-bit samples as signed
            for s in [-128i8, -1, 0, 1, 127] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        let bytes: Arc<[u8]> = Arc::from(cursor.into_inner().as_slice());

        let mut decoder = WavDecoder::open(bytes).unwrap();
        let mut out = vec![0i16; 5];
        assert_eq!(decoder.decode(&mut out, 5).unwrap(), 5);
        assert_eq!(out[0], i16::MIN);
        assert_eq!(out[4], 127 << 8);
    }
}
