//! Error types for mixdown
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the mixdown playback engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A fixed-capacity table (sound data, instances) is full
    #[error("Out of resources: {0}")]
    OutOfResources(String),

    /// Malformed or unsupported asset header
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Deletion refused because live instances still reference the resource
    #[error("Resource in use: {0}")]
    ResourceInUse(String),

    /// A handle referenced a slot that was deleted or recycled
    #[error("Stale handle: {0}")]
    StaleHandle(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the mixdown Error
pub type Result<T> = std::result::Result<T, Error>;
