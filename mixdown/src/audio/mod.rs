//! Audio formats and decoding

pub mod decoder;
pub mod types;
pub mod vorbis;
pub mod wav;

pub use decoder::{open_decoder, Decoder};
pub use types::{AudioFrame, SoundFormat, StreamInfo};
