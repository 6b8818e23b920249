//! Decoder contract tests
//!
//! Verifies the pull-decoder surface across both formats: metadata is
//! available right after open, `decode` tolerates arbitrary chunk sizes,
//! `0` frames appears only at end of stream, and `rewind` restarts at
//! frame 0.

mod helpers;

use helpers::audio_generator::{frame_count, sine_wav, TEST_SAMPLE_RATE};
use helpers::first_vorbis_fixture;
use mixdown::audio::{open_decoder, Decoder};
use mixdown::{Error, SoundFormat};
use std::sync::Arc;

/// Pull the whole stream in fixed-size requests; returns total frames.
fn drain(decoder: &mut Box<dyn Decoder>, chunk_frames: usize) -> usize {
    let channels = decoder.info().channels as usize;
    let mut out = vec![0i16; chunk_frames * channels];
    let mut total = 0;
    loop {
        let frames = decoder.decode(&mut out, chunk_frames).expect("decode");
        if frames == 0 {
            // End of stream is sticky
            assert_eq!(decoder.decode(&mut out, chunk_frames).expect("decode"), 0);
            return total;
        }
        total += frames;
    }
}

#[test]
fn wav_metadata_available_after_open() {
    let stereo = sine_wav(120, 440.0, 0.5, 2);
    let decoder = open_decoder(SoundFormat::Wav, Arc::from(stereo.as_slice())).unwrap();
    let info = decoder.info();
    assert_eq!(info.channels, 2);
    assert_eq!(info.sample_rate, TEST_SAMPLE_RATE);

    let mono = sine_wav(120, 440.0, 0.5, 1);
    let decoder = open_decoder(SoundFormat::Wav, Arc::from(mono.as_slice())).unwrap();
    assert_eq!(decoder.info().channels, 1);
}

#[test]
fn wav_decode_tolerates_odd_chunk_sizes() {
    let bytes = sine_wav(200, 440.0, 0.5, 2);
    let expected = frame_count(200) as usize;

    let mut decoder = open_decoder(SoundFormat::Wav, Arc::from(bytes.as_slice())).unwrap();
    assert_eq!(drain(&mut decoder, 333), expected);

    decoder.rewind().unwrap();
    assert_eq!(drain(&mut decoder, 4096), expected);
}

#[test]
fn wav_sine_is_non_silent_and_bounded() {
    let bytes = sine_wav(50, 440.0, 0.5, 1);
    let mut decoder = open_decoder(SoundFormat::Wav, Arc::from(bytes.as_slice())).unwrap();

    let mut out = vec![0i16; frame_count(50) as usize];
    let out_len = out.len();
    let frames = decoder.decode(&mut out, out_len).unwrap();
    assert_eq!(frames, frame_count(50) as usize);

    let peak = out.iter().map(|s| s.unsigned_abs() as u32).max().unwrap();
    let target = (0.5 * i16::MAX as f32) as u32;
    assert!(peak > target / 2, "peak {} too quiet", peak);
    assert!(peak <= target + 1, "peak {} exceeds amplitude", peak);
}

#[test]
fn wav_garbage_is_invalid_format() {
    let junk: Vec<u8> = (0..255u8).cycle().take(1024).collect();
    assert!(matches!(
        open_decoder(SoundFormat::Wav, Arc::from(junk.as_slice())),
        Err(Error::InvalidFormat(_))
    ));
}

// ---------------------------------------------------------------------
// Ogg Vorbis (fixture-dependent)
// ---------------------------------------------------------------------

#[test]
fn vorbis_metadata_available_after_open() {
    let Some((path, bytes)) = first_vorbis_fixture() else {
        eprintln!("skipping: no .ogg fixture in tests/data");
        return;
    };
    eprintln!("using fixture {}", path.display());

    let decoder = open_decoder(SoundFormat::OggVorbis, Arc::from(bytes.as_slice())).unwrap();
    let info = decoder.info();
    assert!(info.channels == 1 || info.channels == 2);
    assert!(info.sample_rate >= 8_000);
}

#[test]
fn vorbis_chunk_size_does_not_change_totals() {
    let Some((_, bytes)) = first_vorbis_fixture() else {
        eprintln!("skipping: no .ogg fixture in tests/data");
        return;
    };

    let mut decoder = open_decoder(SoundFormat::OggVorbis, Arc::from(bytes.as_slice())).unwrap();
    let small = drain(&mut decoder, 100);
    assert!(small > 0, "fixture decoded to zero frames");

    // Same stream, different pull granularity, same total after rewind
    decoder.rewind().unwrap();
    let large = drain(&mut decoder, 4096);
    assert_eq!(small, large);
}

#[test]
fn vorbis_output_is_non_silent_and_bounded() {
    let Some((_, bytes)) = first_vorbis_fixture() else {
        eprintln!("skipping: no .ogg fixture in tests/data");
        return;
    };

    let mut decoder = open_decoder(SoundFormat::OggVorbis, Arc::from(bytes.as_slice())).unwrap();
    let channels = decoder.info().channels as usize;
    let mut out = vec![0i16; 4096 * channels];
    let mut peak = 0u32;
    loop {
        let frames = decoder.decode(&mut out, 4096).unwrap();
        if frames == 0 {
            break;
        }
        for s in &out[..frames * channels] {
            peak = peak.max(s.unsigned_abs() as u32);
        }
    }
    assert!(peak > 0, "fixture decoded to pure silence");
    assert!(peak <= i16::MAX as u32 + 1);
}

#[test]
fn vorbis_garbage_is_rejected_not_end_of_stream() {
    let junk: Vec<u8> = (0..255u8).cycle().take(8192).collect();
    assert!(open_decoder(SoundFormat::OggVorbis, Arc::from(junk.as_slice())).is_err());
}
