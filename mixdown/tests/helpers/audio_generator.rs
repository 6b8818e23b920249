//! Audio test asset generation
//!
//! Builds deterministic WAV byte buffers in memory with known
//! characteristics (silence, sine waves) so tests can assert on exact
//! frame counts and amplitudes without touching the filesystem.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::io::Cursor;

/// Standard test sample rate (44.1 kHz)
pub const TEST_SAMPLE_RATE: u32 = 44_100;

/// Generate a 16-bit PCM WAV byte buffer containing a sine wave.
///
/// # Arguments
/// * `duration_ms` - Duration in milliseconds
/// * `frequency_hz` - Sine frequency (e.g. 440.0 for A4)
/// * `amplitude` - 0.0-1.0 (0.5 recommended to avoid clipping when mixing)
/// * `channels` - 1 (mono) or 2 (stereo)
pub fn sine_wav(duration_ms: u64, frequency_hz: f32, amplitude: f32, channels: u16) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let total_frames = frame_count(duration_ms);
    let amplitude_i16 = (amplitude * i16::MAX as f32) as i16;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("wav writer");
        for frame_idx in 0..total_frames {
            let t = frame_idx as f32 / TEST_SAMPLE_RATE as f32;
            let sample = ((2.0 * PI * frequency_hz * t).sin() * amplitude_i16 as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).expect("write sample");
            }
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Generate a silent 16-bit PCM WAV byte buffer.
pub fn silent_wav(duration_ms: u64, channels: u16) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).expect("wav writer");
        for _ in 0..frame_count(duration_ms) * channels as u64 {
            writer.write_sample(0i16).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Exact frame count for a duration at the test sample rate.
pub fn frame_count(duration_ms: u64) -> u64 {
    (TEST_SAMPLE_RATE as u64 * duration_ms) / 1000
}
