//! Error types for the stream crate.

use thiserror::Error;

/// Errors that can occur when extracting an audio stream.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error (truncated or out-of-range reads).
    #[error("{0}")]
    Common(#[from] nightwave_common::Error),

    /// The bytes are not a RIFF audio stream.
    ///
    /// Callers probing arbitrary resources treat this as "not audio".
    #[error("not an audio stream: {0}")]
    NotAudioStream(&'static str),

    /// The stream's codec cannot be handled in the requested mode.
    #[error("unsupported codec tag {0:#06x}")]
    UnsupportedCodec(u16),

    /// The stream's codec data is malformed.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, Error>;
