//! Engine configuration
//!
//! Sizing parameters for the buffer pool, the instance table and the
//! per-update mix cadence. Values can come from a TOML file or from
//! `SystemConfig::default()`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Playback engine configuration.
///
/// The pool and source limits bound all per-update work: an `update()` call
/// touches at most `max_sources` instances and `max_buffers` pool entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Total reusable PCM buffers in the pool. The pool never grows past
    /// this after initialization.
    pub max_buffers: u32,

    /// Maximum concurrently live sound instances.
    pub max_sources: u32,

    /// Maximum concurrently live sound data entries.
    pub max_sound_data: u32,

    /// Capacity of one pool buffer, in frames.
    pub buffer_frames: usize,

    /// Frames mixed into the output per `update()` call.
    pub mix_frames: usize,

    /// Target queue depth per instance for decode-ahead.
    pub decode_ahead: usize,

    /// Nominal output sample rate. The mixer does not resample; assets are
    /// expected to match this rate. Used by callers to pace `update()`.
    pub sample_rate: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_buffers: 32,
            max_sources: 16,
            max_sound_data: 128,
            buffer_frames: 1024,
            mix_frames: 1024,
            decode_ahead: 2,
            sample_rate: 44_100,
        }
    }
}

impl SystemConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: SystemConfig =
            toml::from_str(&text).map_err(|e| Error::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_buffers == 0 {
            return Err(Error::Config("max_buffers must be at least 1".into()));
        }
        if self.max_sources == 0 {
            return Err(Error::Config("max_sources must be at least 1".into()));
        }
        if self.max_sound_data == 0 {
            return Err(Error::Config("max_sound_data must be at least 1".into()));
        }
        if self.buffer_frames == 0 {
            return Err(Error::Config("buffer_frames must be at least 1".into()));
        }
        if self.mix_frames == 0 {
            return Err(Error::Config("mix_frames must be at least 1".into()));
        }
        if self.decode_ahead == 0 {
            return Err(Error::Config("decode_ahead must be at least 1".into()));
        }
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be nonzero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SystemConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_buffers, 32);
        assert_eq!(config.max_sources, 16);
    }

    #[test]
    fn zero_buffers_rejected() {
        let config = SystemConfig {
            max_buffers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_decode_ahead_rejected() {
        let config = SystemConfig {
            decode_ahead: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_buffers = 8\nmix_frames = 512").unwrap();

        let config = SystemConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.max_buffers, 8);
        assert_eq!(config.mix_frames, 512);
        // Untouched keys keep their defaults
        assert_eq!(config.max_sources, 16);
    }

    #[test]
    fn toml_garbage_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_buffers = \"lots\"").unwrap();

        assert!(SystemConfig::from_toml_file(file.path()).is_err());
    }
}
