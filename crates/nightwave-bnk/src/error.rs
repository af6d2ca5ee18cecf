//! Error types for the soundbank crate.

use thiserror::Error;

/// Errors that can occur when demuxing a soundbank.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error (truncated or out-of-range reads).
    #[error("{0}")]
    Common(#[from] nightwave_common::Error),

    /// The blob does not start with a bank header chunk.
    ///
    /// Callers probing arbitrary archive entries treat this as "not
    /// audio" rather than a failure.
    #[error("not a soundbank: missing BKHD header chunk")]
    NotASoundBank,

    /// The chunk structure or media index is malformed.
    #[error("corrupt soundbank: {0}")]
    CorruptBank(String),
}

/// Result type for soundbank operations.
pub type Result<T> = std::result::Result<T, Error>;
